//! Module metadata extraction
//!
//! Turns a folder of Terraform files into a [`ModuleRecord`]: header metadata
//! from the main file plus every `variable` and `output` declaration.

pub mod assembler;
pub mod declarations;
pub mod header;

pub use assembler::{discover_modules, ModuleAssembler, ModuleFolder};
pub use declarations::{extract_declarations, Declarations};
pub use header::extract_header;

use serde::{Deserialize, Serialize};

/// Title, description and related modules from the main file's header comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMetadata {
    pub title: String,
    pub description: String,
    pub partners: Vec<String>,
    pub dependencies: Vec<String>,
}

/// A `variable` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRecord {
    pub name: String,
    pub description: String,
    /// Canonical type string, empty when the variable is untyped
    pub declared_type: String,
    /// Canonical rendering of the default, empty when there is none
    pub default_value: String,
    /// Distinguishes `default = ""` from no default at all
    pub has_default: bool,
}

/// An `output` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// Path relative to the repository root, e.g. `modules/s3-bucket`
    pub folder_path: String,
    pub header: HeaderMetadata,
    pub variables: Vec<VariableRecord>,
    pub outputs: Vec<OutputRecord>,
}
