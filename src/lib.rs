pub mod config;
pub mod docs;
pub mod error;
pub mod git;
pub mod hcl;
pub mod module;
pub mod scanner;
pub mod value;

pub use config::{Settings, SETTINGS_FILENAME};
pub use docs::{render_index, render_module_readme, write_readmes, MarkdownWriter};
pub use error::{DocError, Result};
pub use git::{CommitRecord, GitHistory, HistorySource, NoHistory};
pub use hcl::{blocks, ConfigBlock, Expression, HclParser, ParsedFile};
pub use module::{
    discover_modules, extract_declarations, extract_header, Declarations, HeaderMetadata,
    ModuleAssembler, ModuleFolder, ModuleRecord, OutputRecord, VariableRecord,
};
pub use scanner::{scan_modules, DocumentedModule};
pub use value::{canonicalize, ConfigValue, Number};
