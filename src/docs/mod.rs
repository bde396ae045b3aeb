//! Markdown rendering
//!
//! Builds one README per module (header, releases, variables, outputs) and a
//! root index page linking all documented modules.

pub mod markdown;
pub mod readme;

pub use markdown::{inline_code, link, MarkdownWriter};
pub use readme::{render_index, render_module_readme, write_readmes};
