//! Parser trait definition

use std::path::Path;

use crate::parser::types::ParsedFile;

/// Trait for extracting references from a single manifest file
pub trait Parser: Send + Sync {
    /// Check if this parser handles files with the given file name
    fn can_parse(&self, file_name: &str) -> bool;

    /// Parse the content and extract image and chart references.
    /// `path` is recorded on every reference and may feed upstream detection.
    fn parse(&self, content: &str, path: &Path) -> Result<ParsedFile, ParseError>;
}

/// Error type for parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to parse the file structure
    #[error("Failed to parse file: {0}")]
    ParseFailed(String),

    /// Invalid syntax in the file
    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),

    /// Tree-sitter related error
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),
}
