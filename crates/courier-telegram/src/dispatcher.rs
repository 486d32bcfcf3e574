//! Update dispatcher
//!
//! Every update goes through two independent branches: the command branch
//! when the text starts with `/`, and the document branch when a file is
//! attached. A single update may trigger both.
//!
//! Failures never leave the dispatcher. They are logged and, where the user
//! is waiting on an answer, reported back to the chat.

use tracing::{debug, error, info, warn};

use crate::bot::TelegramBot;
use crate::types::{Document, Update};

/// Reply for a `/token` with no registered handler
pub const UNKNOWN_COMMAND_REPLY: &str = "Unknown command. Use /help to see available commands.";
/// Acknowledgment sent before a document is resolved
pub const FILE_ACK_REPLY: &str = "Processing your file...";
/// Reply when a document cannot be resolved to a download URL
pub const FILE_RESOLVE_FAILED_REPLY: &str = "Failed to retrieve file.";
/// Reply when the file processor fails
pub const FILE_PROCESS_FAILED_REPLY: &str = "Failed to process file.";
/// Reply when the result file cannot be uploaded
pub const FILE_SEND_FAILED_REPLY: &str = "Failed to send result file.";

/// Command marker
pub const COMMAND_PREFIX: char = '/';

/// Extract the command token from message text
///
/// Returns the first whitespace-delimited word, marker included, when the
/// text starts with `/`.
pub fn command_token(text: &str) -> Option<&str> {
    if !text.starts_with(COMMAND_PREFIX) {
        return None;
    }
    text.split_whitespace().next()
}

impl TelegramBot {
    /// Dispatch a single update
    pub async fn handle_update(&self, update: &Update) {
        let Some(message) = update.message.as_ref() else {
            debug!("Skipping update {} without message", update.update_id);
            return;
        };

        let chat_id = message.chat.id;

        if let Some(token) = command_token(&message.text) {
            self.dispatch_command(chat_id, token).await;
        }

        if let Some(document) = message.attached_document() {
            self.dispatch_document(chat_id, document).await;
        }
    }

    async fn dispatch_command(&self, chat_id: i64, token: &str) {
        let reply = match self.commands().get(token) {
            Some(handler) => {
                debug!("Running command {} for chat {}", token, chat_id);
                handler.handle(chat_id, self).await
            }
            None => {
                debug!("Unknown command {} from chat {}", token, chat_id);
                UNKNOWN_COMMAND_REPLY.to_string()
            }
        };

        self.reply(chat_id, &reply).await;
    }

    async fn dispatch_document(&self, chat_id: i64, document: &Document) {
        info!(
            "Received document {:?} ({}) from chat {}",
            document.file_name, document.file_id, chat_id
        );

        self.reply(chat_id, FILE_ACK_REPLY).await;

        let file_url = match self.get_file_url(&document.file_id).await {
            Ok(url) => url,
            Err(e) => {
                warn!("Could not resolve file {}: {}", document.file_id, e);
                self.reply(chat_id, FILE_RESOLVE_FAILED_REPLY).await;
                return;
            }
        };

        let Some(processor) = self.file_processor() else {
            debug!("No file processor installed, ignoring {}", document.file_id);
            return;
        };

        let result_path = match processor.process(chat_id, document, &file_url).await {
            Ok(path) => path,
            Err(e) => {
                error!("Processing {} failed: {}", document.file_id, e);
                self.reply(chat_id, FILE_PROCESS_FAILED_REPLY).await;
                return;
            }
        };

        if let Err(e) = self.send_file(chat_id, &result_path).await {
            error!("Sending {} failed: {}", result_path.display(), e);
            self.reply(chat_id, FILE_SEND_FAILED_REPLY).await;
        }

        // Result files are single-use
        if let Err(e) = tokio::fs::remove_file(&result_path).await {
            warn!("Could not remove {}: {}", result_path.display(), e);
        }
    }

    /// Best-effort reply
    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.send_message(chat_id, text).await {
            warn!("Failed to reply to chat {}: {}", chat_id, e);
        }
    }
}
