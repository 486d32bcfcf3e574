//! Error types for courier-core

use thiserror::Error;

/// Main error type for courier-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for courier-core
pub type Result<T> = std::result::Result<T, Error>;
