//! courier-core: shared configuration and error types
//!
//! Loads the `courier.toml` configuration (with `${VAR}` expansion and
//! environment overrides) used by the Telegram bot, the proxy checker and
//! the gateway binary.

pub mod config;
pub mod error;

pub use config::{Config, ProxyConfig, TelegramConfig};
pub use error::{Error, Result};
