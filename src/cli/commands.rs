use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use tf_autodoc::{
    scan_modules, write_readmes, DocError, GitHistory, HistorySource, ModuleAssembler, NoHistory,
    Result, Settings,
};

#[derive(Parser)]
#[command(name = "tf-autodoc")]
#[command(about = "Generate Markdown documentation for a repository of Terraform modules")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Document the modules/ folder of the current repository
    tf-autodoc

    # Document another repository with modules under terraform/
    tf-autodoc --repo ../infra --mods terraform

    # Check that every module parses without writing anything
    tf-autodoc --output-off

    # Print the extracted metadata as JSON
    tf-autodoc --format json
"#)]
pub struct Cli {
    /// Path to the repository containing the modules
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Sub-folder containing the modules (defaults to the settings file, then "modules")
    #[arg(long)]
    pub mods: Option<String>,

    /// Scan the modules without writing README files
    #[arg(long)]
    pub output_off: bool,

    /// Output format (markdown or json)
    #[arg(long, default_value = "markdown")]
    pub format: String,

    /// Do not read commit history (for folders that are not git repositories)
    #[arg(long)]
    pub no_history: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn generate(cli: &Cli) -> Result<()> {
    let mut settings = Settings::load(&cli.repo)?;
    if let Some(mods) = &cli.mods {
        settings.modules_dir = mods.clone();
    }

    if !matches!(cli.format.as_str(), "markdown" | "json") {
        return Err(DocError::Config(format!(
            "Unknown output format: {} (expected markdown or json)",
            cli.format
        )));
    }

    info!("Working on repository: {}", cli.repo.display());
    info!("Modules sub-folder: {}", settings.modules_dir);

    let history = open_history(cli)?;
    let assembler = ModuleAssembler::new(settings.clone());
    let modules = scan_modules(&cli.repo, &assembler, history.as_ref())?;
    info!("Scan complete. Got {} modules", modules.len());

    if cli.format == "json" {
        println!("{}", serde_json::to_string_pretty(&modules)?);
        return Ok(());
    }

    if cli.output_off {
        info!("Output is disabled");
        return Ok(());
    }

    let written = write_readmes(&cli.repo, &modules, &settings)?;
    println!("Wrote {} README files", written.len());

    Ok(())
}

fn open_history(cli: &Cli) -> Result<Box<dyn HistorySource>> {
    if cli.no_history {
        return Ok(Box::new(NoHistory));
    }

    info!("Scanning git repository...");
    let mut git = GitHistory::open(&cli.repo)?;
    git.load_tags()?;
    info!("Got {} tags", git.tags().len());
    Ok(Box::new(git))
}
