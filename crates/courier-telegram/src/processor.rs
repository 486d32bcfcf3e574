//! File processing hook for attached documents

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Document;

/// Processes a document sent to the bot
///
/// Called by the dispatcher once the document's download URL has been
/// resolved. Returns the path of a local file to send back to the chat;
/// the file is removed once the upload has been attempted.
#[async_trait]
pub trait FileProcessor: Send + Sync {
    async fn process(&self, chat_id: i64, document: &Document, file_url: &str) -> Result<PathBuf>;
}
