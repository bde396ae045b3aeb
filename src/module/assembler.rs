use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::config::Settings;
use crate::error::{DocError, Result};
use crate::hcl::{blocks, HclParser};
use crate::module::{extract_declarations, extract_header, HeaderMetadata, ModuleRecord};

/// A module folder found under the modules directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFolder {
    /// Absolute or repository-root-joined path on disk
    pub path: PathBuf,
    /// Path relative to the repository root, using `/` separators
    pub relative: String,
}

/// Lists the direct sub-folders of `<repo_root>/<modules_dir>`, sorted by name.
/// Hidden folders and git-ignored folders are skipped.
pub fn discover_modules(repo_root: &Path, modules_dir: &str) -> Result<Vec<ModuleFolder>> {
    let modules_dir = modules_dir.trim_matches('/');
    let root = repo_root.join(modules_dir);
    std::fs::metadata(&root)?;

    let mut folders = Vec::new();
    for entry in list_dir(&root) {
        let entry = entry?;
        if entry.is_dir() {
            let name = entry
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            folders.push(ModuleFolder {
                relative: format!("{}/{}", modules_dir, name),
                path: entry,
            });
        }
    }

    Ok(folders)
}

/// Non-recursive, name-sorted listing of `dir`, without hidden entries.
fn list_dir(dir: &Path) -> impl Iterator<Item = Result<PathBuf>> {
    WalkBuilder::new(dir)
        .max_depth(Some(1))
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .ignore(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
        .filter(|entry| entry.as_ref().map_or(true, |e| e.depth() > 0))
        .map(|entry| {
            entry
                .map(|e| e.into_path())
                .map_err(|e| DocError::Io(std::io::Error::other(e.to_string())))
        })
}

/// Builds a [`ModuleRecord`] from the configuration files of one module folder.
pub struct ModuleAssembler {
    settings: Settings,
    parser: HclParser,
}

impl ModuleAssembler {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            parser: HclParser::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Configuration files directly inside `dir`, sorted by file name.
    pub fn config_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in list_dir(dir) {
            let path = entry?;
            let is_config = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| self.settings.is_config_file(name));
            if path.is_file() && is_config {
                files.push(path);
            }
        }
        Ok(files)
    }

    pub fn assemble(&self, folder: &ModuleFolder) -> Result<ModuleRecord> {
        let mut record = ModuleRecord {
            folder_path: folder.relative.clone(),
            header: HeaderMetadata::default(),
            variables: Vec::new(),
            outputs: Vec::new(),
        };

        for file in self.config_files(&folder.path)? {
            let parsed = self.parser.parse_file(&file)?;

            let is_main = file
                .file_name()
                .is_some_and(|name| name.to_string_lossy() == self.settings.main_file);
            if is_main {
                record.header = extract_header(&parsed.source)?;
            }

            let declarations = extract_declarations(&blocks(&parsed))?;
            tracing::debug!(
                "{}: {} variables, {} outputs",
                file.display(),
                declarations.variables.len(),
                declarations.outputs.len()
            );
            record.variables.extend(declarations.variables);
            record.outputs.extend(declarations.outputs);
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn folder(root: &Path, name: &str) -> ModuleFolder {
        ModuleFolder {
            path: root.join("modules").join(name),
            relative: format!("modules/{}", name),
        }
    }

    #[test]
    fn test_discover_modules_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "modules/vpc/main.tf", "");
        create_file(temp_dir.path(), "modules/alb/main.tf", "");
        create_file(temp_dir.path(), "modules/.hidden/main.tf", "");
        create_file(temp_dir.path(), "modules/notes.txt", "not a module");

        let modules = discover_modules(temp_dir.path(), "modules").unwrap();
        let names: Vec<_> = modules.iter().map(|m| m.relative.as_str()).collect();
        assert_eq!(names, vec!["modules/alb", "modules/vpc"]);
        assert_eq!(modules[0].path, temp_dir.path().join("modules").join("alb"));
    }

    #[test]
    fn test_discover_modules_missing_folder() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            discover_modules(temp_dir.path(), "modules"),
            Err(DocError::Io(_))
        ));
    }

    #[test]
    fn test_config_files_filters_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        create_file(dir, "variables.tf", "");
        create_file(dir, "main.tf", "");
        create_file(dir, "terraform.tfvars", "");
        create_file(dir, "README.md", "");
        create_file(dir, ".hidden.tf", "");
        create_file(dir, "nested/inner.tf", "");

        let assembler = ModuleAssembler::new(Settings::default());
        let files = assembler.config_files(dir).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["main.tf", "variables.tf"]);
    }

    #[test]
    fn test_assemble_module() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("modules/bucket");
        create_file(
            &dir,
            "main.tf",
            "/*\ntitle: bucket\ndesc: An S3 bucket\ndepends: kms\n*/\n\nresource \"aws_s3_bucket\" \"this\" {\n  bucket = var.name\n}\n",
        );
        create_file(
            &dir,
            "variables.tf",
            "variable \"name\" {\n  type        = string\n  description = \"Bucket name\"\n}\n\nvariable \"tags\" {\n  type    = map(string)\n  default = {}\n}\n",
        );
        create_file(
            &dir,
            "outputs.tf",
            "output \"arn\" {\n  description = \"Bucket ARN\"\n  value       = aws_s3_bucket.this.arn\n}\n",
        );

        let assembler = ModuleAssembler::new(Settings::default());
        let record = assembler.assemble(&folder(temp_dir.path(), "bucket")).unwrap();

        assert_eq!(record.folder_path, "modules/bucket");
        assert_eq!(record.header.title, "bucket");
        assert_eq!(record.header.dependencies, vec!["kms"]);
        let names: Vec<_> = record.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["name", "tags"]);
        assert_eq!(record.variables[1].default_value, "{}");
        assert_eq!(record.outputs.len(), 1);
        assert_eq!(record.outputs[0].description, "Bucket ARN");
    }

    #[test]
    fn test_assemble_without_main_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("modules/bare");
        create_file(&dir, "vars.tf", "variable \"x\" {}\n");

        let assembler = ModuleAssembler::new(Settings::default());
        let record = assembler.assemble(&folder(temp_dir.path(), "bare")).unwrap();
        assert_eq!(record.header, HeaderMetadata::default());
        assert_eq!(record.variables.len(), 1);
    }

    #[test]
    fn test_assemble_propagates_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("modules/broken");
        create_file(&dir, "main.tf", "variable \"x\" {\n");

        let assembler = ModuleAssembler::new(Settings::default());
        let result = assembler.assemble(&folder(temp_dir.path(), "broken"));
        assert!(matches!(result, Err(DocError::Parse { .. })));
    }

    #[test]
    fn test_assemble_custom_main_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("modules/custom");
        create_file(&dir, "module.tf", "/*\ntitle: custom\ndesc: Custom main file\n*/\n");
        create_file(&dir, "main.tf", "/*\ntitle: ignored\ndesc: Not the main file\n*/\n");

        let settings = Settings {
            main_file: "module.tf".to_string(),
            ..Settings::default()
        };
        let record = ModuleAssembler::new(settings)
            .assemble(&folder(temp_dir.path(), "custom"))
            .unwrap();
        assert_eq!(record.header.title, "custom");
    }
}
