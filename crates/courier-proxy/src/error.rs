//! Error types for courier-proxy

use thiserror::Error;

/// courier-proxy error type
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to download proxy list: {0}")]
    Download(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ProxyError>;
