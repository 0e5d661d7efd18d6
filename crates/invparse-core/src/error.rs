//! Error types for the invparse-core library.
//!
//! Field extraction itself never fails; these errors only come from the
//! surroundings of a parse (configuration files, I/O).

use thiserror::Error;

/// Main error type for the invparse library.
#[derive(Error, Debug)]
pub enum InvparseError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for the invparse library.
pub type Result<T> = std::result::Result<T, InvparseError>;
