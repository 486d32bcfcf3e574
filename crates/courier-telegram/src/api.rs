//! Telegram Bot API client
//!
//! Thin wrapper over the HTTP endpoints the bot uses: getUpdates,
//! sendMessage, getFile and sendDocument.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use courier_core::TelegramConfig;

use crate::error::{Result, TelegramError};
use crate::types::{ApiResponse, FileInfo, Update};

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramApiClient {
    client: Client,
    token: String,
    base_url: String,
}

impl std::fmt::Debug for TelegramApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// reqwest errors carry the request URL, which embeds the bot token.
fn http_error(err: reqwest::Error) -> TelegramError {
    TelegramError::Http(err.without_url())
}

impl TelegramApiClient {
    /// Create a new Bot API client
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        if config.bot_token.trim().is_empty() {
            return Err(TelegramError::Config("bot token is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(http_error)?;

        Ok(Self {
            client,
            token: config.bot_token.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Download URL for a `file_path` returned by getFile
    pub fn file_url(&self, file_path: &str) -> String {
        format!(
            "{}/file/bot{}/{}",
            self.base_url,
            self.token,
            file_path.trim_start_matches('/')
        )
    }

    /// Decode a Bot API envelope.
    ///
    /// Error responses come back as non-2xx statuses with a JSON body, so the
    /// HTTP status is only reported when the body is not an envelope.
    async fn decode<T: DeserializeOwned>(
        method: &str,
        response: Response,
    ) -> Result<ApiResponse<T>> {
        let status = response.status();
        let body = response.text().await.map_err(http_error)?;

        serde_json::from_str(&body).map_err(|e| {
            TelegramError::Decode(format!("{} ({}): {}", method, status, e))
        })
    }

    /// Fetch pending updates, starting at `offset` when given
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let mut request = self.client.get(self.method_url("getUpdates"));
        if let Some(offset) = offset {
            request = request.query(&[("offset", offset)]);
        }

        debug!("Calling getUpdates (offset: {:?})", offset);

        let response = request.send().await.map_err(http_error)?;
        let envelope: ApiResponse<Vec<Update>> = Self::decode("getUpdates", response).await?;

        if !envelope.ok {
            return Err(TelegramError::rejected("getUpdates", envelope.description));
        }

        let updates = envelope.result.unwrap_or_default();
        debug!("Received {} updates", updates.len());
        Ok(updates)
    }

    /// Send a text message to a chat
    ///
    /// Only transport failures are errors; a rejection reported in the
    /// response body is logged and otherwise ignored.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        debug!("Sending message to chat {}", chat_id);

        let response = self
            .client
            .get(self.method_url("sendMessage"))
            .query(&[("chat_id", chat_id.to_string()), ("text", text.to_string())])
            .send()
            .await
            .map_err(http_error)?;

        match Self::decode::<serde_json::Value>("sendMessage", response).await {
            Ok(envelope) if !envelope.ok => {
                warn!(
                    "sendMessage to chat {} rejected: {}",
                    chat_id,
                    envelope.description.unwrap_or_default()
                );
            }
            Ok(_) => {}
            Err(e) => debug!("Ignoring sendMessage response: {}", e),
        }

        Ok(())
    }

    /// Resolve a file identifier to a download URL
    pub async fn get_file_url(&self, file_id: &str) -> Result<String> {
        debug!("Resolving file {}", file_id);

        let response = self
            .client
            .get(self.method_url("getFile"))
            .query(&[("file_id", file_id)])
            .send()
            .await
            .map_err(http_error)?;

        let envelope: ApiResponse<FileInfo> = Self::decode("getFile", response).await?;

        if !envelope.ok {
            return Err(TelegramError::rejected("getFile", envelope.description));
        }

        envelope
            .result
            .and_then(|info| info.file_path)
            .filter(|path| !path.is_empty())
            .map(|path| self.file_url(&path))
            .ok_or_else(|| {
                TelegramError::rejected("getFile", Some(format!("could not resolve {}", file_id)))
            })
    }

    /// Upload a local file to a chat as a document
    ///
    /// The file is streamed into a `multipart/form-data` body with a
    /// `chat_id` field and a `document` part.
    pub async fn send_document(&self, chat_id: i64, path: &Path) -> Result<()> {
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        debug!(
            "Uploading {} ({} bytes) to chat {}",
            file_name, length, chat_id
        );

        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part(
                "document",
                Part::stream_with_length(file, length).file_name(file_name.clone()),
            );

        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await
            .map_err(http_error)?;

        let envelope: ApiResponse<serde_json::Value> =
            Self::decode("sendDocument", response).await?;

        if !envelope.ok {
            return Err(TelegramError::rejected("sendDocument", envelope.description));
        }

        info!("Sent document {} to chat {}", file_name, chat_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123:test-token";

    fn client_for(server: &MockServer) -> TelegramApiClient {
        let config = TelegramConfig {
            api_base_url: server.uri(),
            ..TelegramConfig::with_token(TOKEN)
        };
        TelegramApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_api_client_creation() {
        let client = TelegramApiClient::new(&TelegramConfig::with_token(TOKEN));
        assert!(client.is_ok());
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let client = TelegramApiClient::new(&TelegramConfig::default());
        assert!(matches!(client, Err(TelegramError::Config(_))));
    }

    #[test]
    fn test_file_url() {
        let client = TelegramApiClient::new(&TelegramConfig::with_token(TOKEN)).unwrap();
        assert_eq!(
            client.file_url("documents/file_1.txt"),
            "https://api.telegram.org/file/bot123:test-token/documents/file_1.txt"
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let client = TelegramApiClient::new(&TelegramConfig::with_token(TOKEN)).unwrap();
        assert!(!format!("{:?}", client).contains("test-token"));
    }

    #[tokio::test]
    async fn test_get_updates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getUpdates", TOKEN)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": [
                    { "update_id": 1, "message": { "text": "/help", "chat": { "id": 42 } } },
                    { "update_id": 2 }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let updates = client_for(&server).get_updates(None).await.unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].chat_id(), Some(42));
        assert!(updates[1].message.is_none());
    }

    #[tokio::test]
    async fn test_get_updates_sends_offset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getUpdates", TOKEN)))
            .and(query_param("offset", "8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let updates = client_for(&server).get_updates(Some(8)).await.unwrap();
        assert!(updates.is_empty());
    }

    #[tokio::test]
    async fn test_get_updates_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getUpdates", TOKEN)))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "ok": false,
                "error_code": 401,
                "description": "Unauthorized"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).get_updates(None).await.unwrap_err();
        match err {
            TelegramError::PlatformRejected { method, description } => {
                assert_eq!(method, "getUpdates");
                assert_eq!(description, "Unauthorized");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_updates_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getUpdates", TOKEN)))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).get_updates(None).await.unwrap_err();
        assert!(matches!(err, TelegramError::Decode(_)));
    }

    #[tokio::test]
    async fn test_send_message_encodes_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/bot{}/sendMessage", TOKEN)))
            .and(query_param("chat_id", "42"))
            .and(query_param("text", "50% off & more: こんにちは"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": {} })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .send_message(42, "50% off & more: こんにちは")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_message_ignores_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/bot{}/sendMessage", TOKEN)))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "description": "Bad Request: chat not found"
            })))
            .expect(1)
            .mount(&server)
            .await;

        assert!(client_for(&server).send_message(1, "hi").await.is_ok());
    }

    #[tokio::test]
    async fn test_send_message_network_error() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        drop(server);

        let err = client.send_message(1, "hi").await.unwrap_err();
        assert!(matches!(err, TelegramError::Http(_)));
        assert!(!err.to_string().contains("test-token"));
    }

    #[tokio::test]
    async fn test_get_file_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getFile", TOKEN)))
            .and(query_param("file_id", "ABC123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": { "file_id": "ABC123", "file_path": "documents/file_7.txt" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = client_for(&server).get_file_url("ABC123").await.unwrap();
        assert_eq!(
            url,
            format!("{}/file/bot{}/documents/file_7.txt", server.uri(), TOKEN)
        );
    }

    #[tokio::test]
    async fn test_get_file_url_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getFile", TOKEN)))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "description": "Bad Request: invalid file_id"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).get_file_url("nope").await.unwrap_err();
        assert!(matches!(err, TelegramError::PlatformRejected { .. }));
    }

    #[tokio::test]
    async fn test_get_file_url_without_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getFile", TOKEN)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": { "file_id": "ABC123" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).get_file_url("ABC123").await.unwrap_err();
        assert!(matches!(err, TelegramError::PlatformRejected { .. }));
    }

    #[tokio::test]
    async fn test_send_document_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/sendDocument", TOKEN)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": {} })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("result.txt");
        std::fs::write(&file_path, "10.0.0.1:8080\n").unwrap();

        client_for(&server)
            .send_document(77, &file_path)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);

        let content_type = requests[0]
            .headers
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data"));

        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"chat_id\""));
        assert!(body.contains("77"));
        assert!(body.contains("name=\"document\"; filename=\"result.txt\""));
        assert!(body.contains("10.0.0.1:8080"));
    }

    #[tokio::test]
    async fn test_send_document_missing_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .send_document(1, Path::new("/nonexistent/courier/result.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, TelegramError::Io(_)));
    }

    #[tokio::test]
    async fn test_send_document_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/sendDocument", TOKEN)))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "description": "Bad Request: file is empty"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("empty.txt");
        std::fs::write(&file_path, "").unwrap();

        let err = client_for(&server)
            .send_document(1, &file_path)
            .await
            .unwrap_err();
        assert!(matches!(err, TelegramError::PlatformRejected { .. }));
    }
}
