//! Terraform/HCL front end built on tree-sitter.

pub mod block;
pub(crate) mod eval;
pub mod parser;

pub use block::{blocks, Attribute, ConfigBlock, Expression};
pub use parser::{HclParser, ParsedFile};
