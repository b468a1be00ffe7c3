//! Error types for mapper-codegen

use thiserror::Error;

use crate::pipeline::GenerationReport;

/// Result type alias for mapper-codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Failed to parse SQL schema: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Every problem found by `CodegenConfig::validate`, reported together
    #[error("Invalid configuration:\n  {}", .0.join("\n  "))]
    ValidationError(Vec<String>),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Metadata lookup failed: {0}")]
    MetadataError(String),

    #[error("Cannot resolve target directory: {0}")]
    DirectoryError(String),

    #[error("Cannot merge {file}: {reason}")]
    MergeError { file: String, reason: String },

    #[error("Cannot find a free file name for {0} (tried .1 through .999)")]
    FileNameExhausted(String),

    /// Carries the warnings and files of the phases that finished
    #[error("Generation cancelled after {} file(s)", .0.files.len())]
    Cancelled(Box<GenerationReport>),
}

impl From<sqlparser::parser::ParserError> for CodegenError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        CodegenError::ParseError(err.to_string())
    }
}

impl From<config::ConfigError> for CodegenError {
    fn from(err: config::ConfigError) -> Self {
        CodegenError::ConfigError(err.to_string())
    }
}

impl From<regex::Error> for CodegenError {
    fn from(err: regex::Error) -> Self {
        CodegenError::ConfigError(err.to_string())
    }
}
