use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::{DocError, Result};

/// A commit that touched a module's configuration files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    pub message: String,
    /// Annotated tag pointing at this commit, empty if untagged
    pub tag: String,
}

impl CommitRecord {
    pub fn is_tagged(&self) -> bool {
        !self.tag.is_empty()
    }

    pub fn short_hash(&self) -> &str {
        self.hash.get(..6).unwrap_or(&self.hash)
    }
}

/// Source of per-module commit history.
pub trait HistorySource: Sync {
    /// Commits touching configuration files under `subpath`, newest first.
    fn commits_for(&self, subpath: &str) -> Result<Vec<CommitRecord>>;
}

/// History source for folders that are not under version control.
pub struct NoHistory;

impl HistorySource for NoHistory {
    fn commits_for(&self, _subpath: &str) -> Result<Vec<CommitRecord>> {
        Ok(Vec::new())
    }
}

/// Reads commit and tag history with the `git` CLI.
pub struct GitHistory {
    repo_path: PathBuf,
    tags: HashMap<String, String>,
}

const FIELD_SEP: char = '\x1f';
const RECORD_SEP: char = '\x1e';

impl GitHistory {
    pub fn open(repo_path: impl AsRef<Path>) -> Result<Self> {
        let repo_path = repo_path.as_ref().to_path_buf();

        let output = Command::new("git")
            .args(["rev-parse", "--is-inside-work-tree"])
            .current_dir(&repo_path)
            .output()
            .map_err(|e| DocError::Git(format!("Failed to run git: {}", e)))?;

        if !output.status.success() {
            return Err(DocError::Git(format!(
                "Not a git repository: {}",
                repo_path.display()
            )));
        }

        Ok(Self {
            repo_path,
            tags: HashMap::new(),
        })
    }

    /// Loads the commit-hash to tag-name map from annotated tags.
    ///
    /// Must run before any [`HistorySource::commits_for`] lookup; lightweight
    /// tags are ignored.
    pub fn load_tags(&mut self) -> Result<()> {
        let stdout = self.run(&[
            "for-each-ref",
            "--format=%(objecttype)%09%(refname:strip=2)%09%(*objectname)",
            "refs/tags",
        ])?;

        self.tags = Self::parse_tag_refs(&stdout);
        Ok(())
    }

    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .map_err(|e| DocError::Git(format!("Failed to run git {}: {}", args[0], e)))?;

        if !output.status.success() {
            return Err(DocError::Git(format!(
                "git {} failed: {}",
                args[0],
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn parse_tag_refs(stdout: &str) -> HashMap<String, String> {
        let mut tags = HashMap::new();
        for line in stdout.lines() {
            let mut parts = line.split('\t');
            let (Some(object_type), Some(name), Some(target)) =
                (parts.next(), parts.next(), parts.next())
            else {
                continue;
            };
            if object_type == "tag" && !target.is_empty() {
                tags.insert(target.to_string(), name.to_string());
            } else {
                tracing::debug!("Skipping lightweight tag {}", name);
            }
        }
        tags
    }

    fn parse_log(&self, stdout: &str) -> Vec<CommitRecord> {
        stdout
            .split(RECORD_SEP)
            .filter_map(|record| {
                let record = record.trim_start_matches(['\n', '\r']);
                let (hash, message) = record.split_once(FIELD_SEP)?;
                let hash = hash.trim();
                if hash.is_empty() {
                    return None;
                }
                Some(CommitRecord {
                    hash: hash.to_string(),
                    message: message.trim_end_matches(['\n', '\r']).to_string(),
                    tag: self.tags.get(hash).cloned().unwrap_or_default(),
                })
            })
            .collect()
    }
}

impl HistorySource for GitHistory {
    fn commits_for(&self, subpath: &str) -> Result<Vec<CommitRecord>> {
        let subpath = subpath.trim_matches('/');
        let format = format!("--format=%H{}%B{}", FIELD_SEP, RECORD_SEP);
        let lower = format!(":(glob){}/**/*tf", subpath);
        let upper = format!(":(glob){}/**/*TF", subpath);

        let stdout = self.run(&["log", &format, "--", &lower, &upper])?;
        Ok(self.parse_log(&stdout))
    }
}
