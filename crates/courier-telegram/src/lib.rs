//! courier-telegram: Telegram Bot API client and update dispatcher
//!
//! Polls the Bot API for updates, routes `/commands` to registered
//! handlers, and runs attached documents through a [`FileProcessor`]
//! before uploading the result back to the chat.

pub mod api;
pub mod bot;
pub mod dispatcher;
pub mod error;
pub mod processor;
pub mod registry;
pub mod types;

pub use api::TelegramApiClient;
pub use bot::TelegramBot;
pub use error::{Result, TelegramError};
pub use processor::FileProcessor;
pub use registry::{CommandHandler, CommandRegistry};
pub use types::{Chat, Document, Message, Update};
