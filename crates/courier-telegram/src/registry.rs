//! Command registry
//!
//! Maps command tokens (including the leading `/`) to handlers.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::bot::TelegramBot;

/// Handler for a `/command`
///
/// Receives the chat the command was sent from and a handle to the bot,
/// and returns the reply text.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, chat_id: i64, bot: &TelegramBot) -> String;
}

/// Adapter registering a plain closure as a [`CommandHandler`]
pub(crate) struct FnCommand<F>(pub(crate) F);

#[async_trait]
impl<F> CommandHandler for FnCommand<F>
where
    F: Fn(i64, &TelegramBot) -> String + Send + Sync,
{
    async fn handle(&self, chat_id: i64, bot: &TelegramBot) -> String {
        (self.0)(chat_id, bot)
    }
}

/// Registry of command handlers
///
/// Registration takes `&self` so commands can be added while the bot is
/// dispatching.
#[derive(Default)]
pub struct CommandRegistry {
    commands: DashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            commands: DashMap::new(),
        }
    }

    /// Register a handler
    ///
    /// If a handler with the same token already exists, it will be replaced.
    pub fn register(&self, token: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.commands.insert(token.into(), handler);
    }

    /// Get a handler by exact token
    pub fn get(&self, token: &str) -> Option<Arc<dyn CommandHandler>> {
        self.commands.get(token).map(|entry| Arc::clone(entry.value()))
    }

    /// Check if a command is registered
    pub fn contains(&self, token: &str) -> bool {
        self.commands.contains_key(token)
    }

    /// Get the number of registered commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if no commands are registered
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered command tokens, sorted
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }
}
