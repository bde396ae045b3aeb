use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Malformed declaration: {kind} block at line {line} is missing its name label")]
    MalformedDeclaration { kind: String, line: usize },

    #[error("Invalid type expression `{expression}`: {message}")]
    TypeExpression { expression: String, message: String },

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Unrepresentable value: {0}")]
    UnrepresentableValue(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DocError>;
