//! Error types for drum-membrane.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MembraneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, MembraneError>;

/// Shorthand for building an [`MembraneError::InvalidConfig`].
pub(crate) fn invalid(msg: impl Into<String>) -> MembraneError {
    MembraneError::InvalidConfig(msg.into())
}
