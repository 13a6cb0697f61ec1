//! Error types for the editor

use scribe_parser::{ModelError, ParseError, RegistryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Edit error: {0}")]
    Model(#[from] ModelError),

    #[error("Title level error: {0}")]
    Registry(#[from] RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Document is not file-backed")]
    NotFileBacked,
}
