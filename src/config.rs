//! Repository settings file
//!
//! An optional `.tf-autodoc.yml` at the repository root overrides the defaults:
//!
//! ```yaml
//! modules_dir: modules
//! main_file: main.tf
//! extensions:
//!   - tf
//! readme_name: README.md
//! index_title: Terraform Modules
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DocError, Result};

/// Name of the settings file at the repository root
pub const SETTINGS_FILENAME: &str = ".tf-autodoc.yml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Folder under the repository root holding one sub-folder per module
    pub modules_dir: String,

    /// File whose header comment describes the module
    pub main_file: String,

    /// Extensions of configuration files to parse, without the dot
    pub extensions: Vec<String>,

    /// Name of the generated Markdown files
    pub readme_name: String,

    /// Title of the root index page
    pub index_title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            modules_dir: "modules".to_string(),
            main_file: "main.tf".to_string(),
            extensions: vec!["tf".to_string()],
            readme_name: "README.md".to_string(),
            index_title: "Terraform Modules".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from `repo_root`, falling back to defaults when the
    /// settings file does not exist.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let path = repo_root.join(SETTINGS_FILENAME);
        if !path.is_file() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Settings = serde_yaml::from_str(content)
            .map_err(|e| DocError::Config(format!("Invalid {}: {}", SETTINGS_FILENAME, e)))?;

        if settings.extensions.is_empty() {
            return Err(DocError::Config(
                "extensions must list at least one file extension".to_string(),
            ));
        }

        Ok(settings)
    }

    /// Whether `file_name` is a configuration file to parse.
    pub fn is_config_file(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.trim_start_matches('.') == ext)
            })
    }
}
