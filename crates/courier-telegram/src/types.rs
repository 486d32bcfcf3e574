//! Telegram Bot API types
//!
//! Only the subset of fields the dispatcher reads is modelled; unknown
//! fields in API responses are ignored.

use serde::{Deserialize, Serialize};

/// Inbound update from getUpdates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Monotonic update identifier, used to advance the polling offset
    pub update_id: i64,
    /// New incoming message (absent for other update kinds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

impl Update {
    /// Chat the update is addressed to, if it carries a message
    pub fn chat_id(&self) -> Option<i64> {
        self.message.as_ref().map(|m| m.chat.id)
    }
}

/// Incoming message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message text (empty for media-only messages)
    #[serde(default)]
    pub text: String,
    /// Conversation the message belongs to
    pub chat: Chat,
    /// Attached document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
}

impl Message {
    /// Attached document with a non-empty file identifier
    pub fn attached_document(&self) -> Option<&Document> {
        self.document.as_ref().filter(|d| !d.file_id.is_empty())
    }
}

/// Chat reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Document attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Identifier used with getFile
    #[serde(default)]
    pub file_id: String,
    /// Original file name as sent by the user
    #[serde(default)]
    pub file_name: String,
}

/// Generic Bot API response envelope
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

/// Result of getFile
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FileInfo {
    #[serde(default)]
    pub file_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_text_update() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 10,
            "message": {
                "message_id": 1,
                "text": "/start now",
                "chat": { "id": 42, "type": "private" }
            }
        }))
        .unwrap();

        assert_eq!(update.update_id, 10);
        assert_eq!(update.chat_id(), Some(42));
        let message = update.message.unwrap();
        assert_eq!(message.text, "/start now");
        assert!(message.attached_document().is_none());
    }

    #[test]
    fn test_decode_document_update() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 11,
            "message": {
                "chat": { "id": 5 },
                "document": { "file_id": "ABC123", "file_name": "proxies.txt" }
            }
        }))
        .unwrap();

        let message = update.message.unwrap();
        assert!(message.text.is_empty());
        let document = message.attached_document().unwrap();
        assert_eq!(document.file_id, "ABC123");
        assert_eq!(document.file_name, "proxies.txt");
    }

    #[test]
    fn test_empty_file_id_is_not_attached() {
        let message = Message {
            text: String::new(),
            chat: Chat { id: 1 },
            document: Some(Document::default()),
        };
        assert!(message.attached_document().is_none());
    }

    #[test]
    fn test_decode_update_without_message() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 12,
            "edited_message": { "chat": { "id": 1 }, "text": "edit" }
        }))
        .unwrap();

        assert!(update.message.is_none());
        assert_eq!(update.chat_id(), None);
    }

    #[test]
    fn test_decode_rejected_envelope() {
        let response: ApiResponse<FileInfo> = serde_json::from_value(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: invalid file_id"
        }))
        .unwrap();

        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(
            response.description.as_deref(),
            Some("Bad Request: invalid file_id")
        );
    }
}
