// SPDX-License-Identifier: MIT OR Apache-2.0
//! Application errors.

use castline_timeline::{ConfigError, DocumentError};
use thiserror::Error;

/// Errors surfaced by the `castline` binary
#[derive(Debug, Error)]
pub enum AppError {
    /// Nothing to open
    #[error("No document given")]
    NoDocument,

    /// Document could not be loaded, validated or saved
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Settings could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Event script or output could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Event script is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the binary
pub type Result<T> = std::result::Result<T, AppError>;
