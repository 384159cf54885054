//! Error types for the transport layer.
//!
//! [`HandwitchError`] is returned by [`crate::Bot`] implementations and config helpers.

use thiserror::Error;

/// Top-level error for transport, config and IO failures.
#[derive(Error, Debug)]
pub enum HandwitchError {
    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations; uses [`HandwitchError`].
pub type Result<T> = std::result::Result<T, HandwitchError>;
