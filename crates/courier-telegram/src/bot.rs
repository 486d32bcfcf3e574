//! Telegram bot implementation
//!
//! [`TelegramBot`] owns the API client, the command registry and the
//! optional file processor, and drives the getUpdates polling loop.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use courier_core::TelegramConfig;

use crate::api::TelegramApiClient;
use crate::error::{Result, TelegramError};
use crate::processor::FileProcessor;
use crate::registry::{CommandHandler, CommandRegistry, FnCommand};
use crate::types::Update;

/// Telegram bot
pub struct TelegramBot {
    api: TelegramApiClient,
    commands: CommandRegistry,
    processor: Option<Arc<dyn FileProcessor>>,
    poll_interval: Duration,
}

impl TelegramBot {
    /// Create a new bot with an empty command registry
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let api = TelegramApiClient::new(config)?;

        Ok(Self {
            api,
            commands: CommandRegistry::new(),
            processor: None,
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
        })
    }

    /// Install the processor used for attached documents
    pub fn with_file_processor(mut self, processor: Arc<dyn FileProcessor>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub(crate) fn file_processor(&self) -> Option<Arc<dyn FileProcessor>> {
        self.processor.clone()
    }

    /// Get the API client
    pub fn api(&self) -> &TelegramApiClient {
        &self.api
    }

    /// Register a closure as the handler for `token`
    ///
    /// The token includes the marker, e.g. `/start`. Registering an existing
    /// token replaces its handler.
    pub fn register_command<F>(&self, token: impl Into<String>, handler: F)
    where
        F: Fn(i64, &TelegramBot) -> String + Send + Sync + 'static,
    {
        self.commands.register(token, Arc::new(FnCommand(handler)));
    }

    /// Register a [`CommandHandler`] for `token`
    pub fn register_handler(&self, token: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.commands.register(token, handler);
    }

    /// Get the command registry
    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Registered command tokens, sorted
    pub fn command_names(&self) -> Vec<String> {
        self.commands.command_names()
    }

    /// Run the handler registered for `token` and return its reply
    pub async fn invoke_command(&self, chat_id: i64, token: &str) -> Result<String> {
        let handler = self
            .commands
            .get(token)
            .ok_or_else(|| TelegramError::CommandNotFound(token.to_string()))?;

        debug!("Running command {} for chat {}", token, chat_id);
        Ok(handler.handle(chat_id, self).await)
    }

    /// Fetch pending updates
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        self.api.get_updates(offset).await
    }

    /// Send a text message
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.api.send_message(chat_id, text).await
    }

    /// Resolve a file identifier to its download URL
    pub async fn get_file_url(&self, file_id: &str) -> Result<String> {
        self.api.get_file_url(file_id).await
    }

    /// Upload a local file to a chat as a document
    pub async fn send_file(&self, chat_id: i64, path: impl AsRef<Path>) -> Result<()> {
        self.api.send_document(chat_id, path.as_ref()).await
    }

    /// Fetch and dispatch one batch of updates
    ///
    /// `cursor` holds the next getUpdates offset. It is moved past every
    /// dispatched update so the same update is never delivered twice.
    pub async fn poll_once(&self, cursor: &mut Option<i64>) -> Result<usize> {
        let mut updates = self.get_updates(*cursor).await?;
        updates.sort_by_key(|u| u.update_id);

        let mut processed = 0;
        for update in &updates {
            if cursor.is_some_and(|next| update.update_id < next) {
                debug!("Skipping already processed update {}", update.update_id);
                continue;
            }

            self.handle_update(update).await;
            *cursor = Some(update.update_id + 1);
            processed += 1;
        }

        Ok(processed)
    }

    /// Acknowledge every update below `cursor`
    ///
    /// Telegram only drops an update once getUpdates is called with a higher
    /// offset, so this must run after the last batch before exiting. Updates
    /// returned by this call are left pending for the next session.
    pub async fn confirm(&self, cursor: Option<i64>) -> Result<()> {
        let Some(offset) = cursor else {
            return Ok(());
        };

        debug!("Confirming updates below {}", offset);
        self.get_updates(Some(offset)).await?;
        Ok(())
    }

    /// Poll for updates until a shutdown signal is received
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        info!(
            "Starting Telegram bot (poll interval: {}s, {} commands)",
            self.poll_interval.as_secs(),
            self.commands.len()
        );

        let mut poll_interval = interval(self.poll_interval);
        poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cursor: Option<i64> = None;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    info!("Received shutdown signal");
                    break;
                }
                _ = poll_interval.tick() => {
                    match self.poll_once(&mut cursor).await {
                        Ok(count) if count > 0 => info!("Processed {} updates", count),
                        Ok(_) => {}
                        Err(e) => error!("Error polling updates: {}", e),
                    }
                }
            }
        }

        if let Err(e) = self.confirm(cursor).await {
            error!("Failed to confirm processed updates: {}", e);
        }

        info!("Telegram bot stopped");
        Ok(())
    }
}
