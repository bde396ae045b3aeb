//! Repository scan: module metadata joined with commit history.

use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::git::{CommitRecord, HistorySource};
use crate::module::{discover_modules, ModuleAssembler, ModuleRecord};

/// A module together with the commits that touched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentedModule {
    pub module: ModuleRecord,
    pub commits: Vec<CommitRecord>,
}

impl DocumentedModule {
    pub fn releases(&self) -> impl Iterator<Item = &CommitRecord> {
        self.commits.iter().filter(|c| c.is_tagged())
    }
}

/// Scans every module folder in parallel.
///
/// Results are keyed by the module's folder path, so their order does not
/// depend on which worker finished first. When modules fail, the error of the
/// first one in path order is returned.
pub fn scan_modules(
    repo_root: &Path,
    assembler: &ModuleAssembler,
    history: &dyn HistorySource,
) -> Result<BTreeMap<String, DocumentedModule>> {
    let folders = discover_modules(repo_root, &assembler.settings().modules_dir)?;
    info!("Found {} module folders", folders.len());

    let results: Vec<Result<DocumentedModule>> = folders
        .par_iter()
        .map(|folder| -> Result<DocumentedModule> {
            let module = assembler.assemble(folder)?;
            let commits = history.commits_for(&folder.relative)?;
            info!(
                "{}: {} variables, {} outputs, {} commits",
                folder.relative,
                module.variables.len(),
                module.outputs.len(),
                commits.len()
            );
            Ok(DocumentedModule { module, commits })
        })
        .collect();

    // `folders` is sorted, and an indexed collect keeps that order
    folders
        .iter()
        .zip(results)
        .map(|(folder, result)| result.map(|module| (folder.relative.clone(), module)))
        .collect()
}
