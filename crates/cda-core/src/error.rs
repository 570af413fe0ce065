//! Error types for CDA

use thiserror::Error;

/// Main error type for CDA
#[derive(Error, Debug)]
pub enum CDAError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CDA operations
pub type Result<T> = std::result::Result<T, CDAError>;
