//! Error types for courier-telegram

use thiserror::Error;

/// courier-telegram error type
#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Telegram rejected {method}: {description}")]
    PlatformRejected { method: String, description: String },

    #[error("Unknown command: {0}")]
    CommandNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File processing failed: {0}")]
    FileProcessing(String),
}

impl TelegramError {
    pub(crate) fn rejected(method: &str, description: Option<String>) -> Self {
        Self::PlatformRejected {
            method: method.to_string(),
            description: description.unwrap_or_else(|| "no description".to_string()),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TelegramError>;
