use std::path::PathBuf;
use thiserror::Error;

/// Result type for declaration source operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors that can occur while extracting declarations
#[derive(Error, Debug)]
pub enum SourceError {
    /// Failed to parse the source code
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    /// No go.mod found above the scanned directory
    #[error("No go.mod found for {dir} (searched {depth} parent directories)")]
    ModuleNotFound { dir: PathBuf, depth: usize },

    /// go.mod without a module directive
    #[error("Invalid go.mod at {0}: missing module directive")]
    InvalidModule(PathBuf),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Declaration units could not be decoded
    #[error("Invalid declaration units: {0}")]
    InvalidUnits(#[from] serde_json::Error),
}

impl SourceError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
