//! README generation for modules and the repository index.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::Settings;
use crate::docs::markdown::{inline_code, link, MarkdownWriter};
use crate::error::Result;
use crate::scanner::DocumentedModule;

const NO_RELEASES: &str = "There have been no releases yet for this module";

/// Renders the README of a single module.
pub fn render_module_readme(module: &DocumentedModule, settings: &Settings) -> String {
    module_readme(module, settings).into_string()
}

fn module_readme(module: &DocumentedModule, settings: &Settings) -> MarkdownWriter {
    let record = &module.module;
    let mut w = MarkdownWriter::new();

    w.h1_underline(&record.header.title);
    w.paragraph(&record.header.description);

    for (heading, names) in [
        ("Depends on", &record.header.dependencies),
        ("Works with", &record.header.partners),
    ] {
        if names.is_empty() {
            continue;
        }
        w.h2_underline(heading);
        for name in names {
            w.bullet(&link(name, &format!("../{}/{}", name, settings.readme_name)));
        }
        w.paragraph("");
    }

    w.h2_underline("Releases");
    let releases: Vec<Vec<String>> = module
        .releases()
        .map(|commit| {
            vec![
                commit.tag.clone(),
                commit.message.trim_matches(['\r', '\n']).to_string(),
                inline_code(commit.short_hash()),
            ]
        })
        .collect();
    if releases.is_empty() {
        w.paragraph(NO_RELEASES);
    } else {
        w.table(&["Tag", "Message", "Commit"], &releases);
    }

    let variables: Vec<Vec<String>> = record
        .variables
        .iter()
        .map(|var| {
            let declared_type = if var.declared_type.is_empty() {
                inline_code("not specified")
            } else {
                inline_code(&var.declared_type)
            };
            vec![
                inline_code(&var.name),
                declared_type,
                var.description.clone(),
                inline_code(&var.default_value),
            ]
        })
        .collect();
    w.h2_underline("Variables");
    w.table(&["Name", "Type", "Description", "Default Value"], &variables);

    if !record.outputs.is_empty() {
        let outputs: Vec<Vec<String>> = record
            .outputs
            .iter()
            .map(|out| vec![out.name.clone(), out.description.clone()])
            .collect();
        w.h2_underline("Outputs");
        w.table(&["Name", "Description"], &outputs);
    }

    w
}

/// Renders the repository index linking every titled module.
pub fn render_index(modules: &BTreeMap<String, DocumentedModule>, settings: &Settings) -> String {
    index(modules, settings).into_string()
}

fn index(modules: &BTreeMap<String, DocumentedModule>, settings: &Settings) -> MarkdownWriter {
    let mut w = MarkdownWriter::new();
    w.h1_underline(&settings.index_title);
    w.paragraph("This is a collection of terraform modules");
    w.paragraph("Click on the links to see the details of each of the modules");
    w.paragraph("This documentation is auto-generated from the terraform files using tf-autodoc.");

    let mut rows = Vec::new();
    for (folder, module) in modules {
        let header = &module.module.header;
        if header.title.is_empty() {
            warn!("No header found for module in {}", folder);
            continue;
        }
        rows.push(vec![
            header.title.clone(),
            header.description.clone(),
            link("more details", &format!("{}/{}", folder, settings.readme_name)),
        ]);
    }

    w.h2_underline("Modules");
    w.table(&["Module", "Description", "Link"], &rows);
    w
}

/// Writes the index and every module README under `repo_root`.
/// Returns the paths written.
pub fn write_readmes(
    repo_root: &Path,
    modules: &BTreeMap<String, DocumentedModule>,
    settings: &Settings,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(modules.len() + 1);

    let index_path = repo_root.join(&settings.readme_name);
    index(modules, settings).write_to(&index_path)?;
    written.push(index_path);

    for (folder, module) in modules {
        let path = repo_root.join(folder).join(&settings.readme_name);
        info!(
            "Writing {} with {} releases",
            path.display(),
            module.releases().count()
        );
        module_readme(module, settings).write_to(&path)?;
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::CommitRecord;
    use crate::module::{HeaderMetadata, ModuleRecord, OutputRecord, VariableRecord};

    fn module(title: &str) -> DocumentedModule {
        DocumentedModule {
            module: ModuleRecord {
                folder_path: format!("modules/{}", title),
                header: HeaderMetadata {
                    title: title.to_string(),
                    description: format!("The {} module", title),
                    partners: Vec::new(),
                    dependencies: Vec::new(),
                },
                variables: Vec::new(),
                outputs: Vec::new(),
            },
            commits: Vec::new(),
        }
    }

    fn commit(hash: &str, message: &str, tag: &str) -> CommitRecord {
        CommitRecord {
            hash: hash.to_string(),
            message: message.to_string(),
            tag: tag.to_string(),
        }
    }

    #[test]
    fn test_module_readme_minimal() {
        let readme = render_module_readme(&module("vpc"), &Settings::default());
        assert_eq!(
            readme,
            "vpc\n======\n\nThe vpc module\nReleases\n------\n\n\
             There have been no releases yet for this module\n\
             Variables\n------\n\n|Name | Type | Description | Default Value|\n--- | --- | --- | ---\n\n"
        );
    }

    #[test]
    fn test_module_readme_full() {
        let mut m = module("bucket");
        m.module.header.dependencies = vec!["kms".to_string()];
        m.module.header.partners = vec!["cdn".to_string()];
        m.module.variables = vec![
            VariableRecord {
                name: "name".to_string(),
                description: "Bucket name".to_string(),
                declared_type: String::new(),
                default_value: String::new(),
                has_default: false,
            },
            VariableRecord {
                name: "tags".to_string(),
                description: "Tags".to_string(),
                declared_type: "map(string)".to_string(),
                default_value: "{env=dev}".to_string(),
                has_default: true,
            },
        ];
        m.module.outputs = vec![OutputRecord {
            name: "arn".to_string(),
            description: "Bucket ARN".to_string(),
        }];
        m.commits = vec![
            commit("1234567890", "Second release\n", "v1.1.0"),
            commit("abcdef0123", "Untagged change", ""),
            commit("fedcba9876", "First release", "v1.0.0"),
        ];

        let readme = render_module_readme(&m, &Settings::default());

        assert!(readme.contains("Depends on\n------\n\n* [kms](../kms/README.md)\n\n"));
        assert!(readme.contains("Works with\n------\n\n* [cdn](../cdn/README.md)\n\n"));
        assert!(readme.contains(
            "|Tag | Message | Commit|\n--- | --- | ---\nv1.1.0 | Second release | `123456`\nv1.0.0 | First release | `fedcba`\n"
        ));
        assert!(!readme.contains("Untagged change"));
        assert!(readme.contains("`name` | `not specified` | Bucket name | ``\n"));
        assert!(readme.contains("`tags` | `map(string)` | Tags | `{env=dev}`\n"));
        assert!(readme.contains("Outputs\n------\n\n|Name | Description|\n--- | ---\narn | Bucket ARN\n"));
        assert!(!readme.contains(NO_RELEASES));
    }

    #[test]
    fn test_index_skips_untitled_modules() {
        let mut modules = BTreeMap::new();
        modules.insert("modules/vpc".to_string(), module("vpc"));
        modules.insert("modules/alb".to_string(), module("alb"));
        let mut untitled = module("untitled");
        untitled.module.header = HeaderMetadata::default();
        modules.insert("modules/untitled".to_string(), untitled);

        let index = render_index(&modules, &Settings::default());
        assert!(index.starts_with("Terraform Modules\n======\n\n"));
        assert!(index.contains(
            "|Module | Description | Link|\n--- | --- | ---\n\
             alb | The alb module | [more details](modules/alb/README.md)\n\
             vpc | The vpc module | [more details](modules/vpc/README.md)\n"
        ));
        assert!(!index.contains("untitled"));
    }

    #[test]
    fn test_write_readmes_missing_module_folder() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut modules = BTreeMap::new();
        modules.insert("modules/gone".to_string(), module("gone"));

        let result = write_readmes(temp_dir.path(), &modules, &Settings::default());
        assert!(matches!(result, Err(crate::error::DocError::Io(_))));
    }

    #[test]
    fn test_write_readmes() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("modules/vpc")).unwrap();
        let mut modules = BTreeMap::new();
        modules.insert("modules/vpc".to_string(), module("vpc"));

        let written = write_readmes(temp_dir.path(), &modules, &Settings::default()).unwrap();
        assert_eq!(
            written,
            vec![
                temp_dir.path().join("README.md"),
                temp_dir.path().join("modules/vpc/README.md"),
            ]
        );
        let readme = std::fs::read_to_string(temp_dir.path().join("modules/vpc/README.md")).unwrap();
        assert_eq!(readme, render_module_readme(&modules["modules/vpc"], &Settings::default()));
        let index = std::fs::read_to_string(temp_dir.path().join("README.md")).unwrap();
        assert_eq!(index, render_index(&modules, &Settings::default()));
    }
}
