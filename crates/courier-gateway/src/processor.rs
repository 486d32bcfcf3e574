//! Proxy checker adapter for the bot's file processing hook

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use courier_core::ProxyConfig;
use courier_proxy::{save_results, ProxyChecker, ProxyError};
use courier_telegram::{Document, FileProcessor, TelegramError};

/// File name used when the document has none
const DEFAULT_FILE_NAME: &str = "proxies.txt";

/// Checks the proxy list in a received document and writes the reachable
/// entries to `{output_dir}/checked_{chat_id}_{file_name}`
pub struct ProxyFileProcessor {
    checker: ProxyChecker,
    output_dir: PathBuf,
}

impl ProxyFileProcessor {
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        Ok(Self {
            checker: ProxyChecker::new(config)?,
            output_dir: PathBuf::from(&config.output_dir),
        })
    }

    fn result_path(&self, chat_id: i64, file_name: &str) -> PathBuf {
        self.output_dir
            .join(format!("checked_{}_{}", chat_id, sanitize_file_name(file_name)))
    }
}

#[async_trait]
impl FileProcessor for ProxyFileProcessor {
    async fn process(
        &self,
        chat_id: i64,
        document: &Document,
        file_url: &str,
    ) -> courier_telegram::Result<PathBuf> {
        let reachable = self
            .checker
            .check_url(file_url)
            .await
            .map_err(|e| TelegramError::FileProcessing(e.to_string()))?;

        let path = self.result_path(chat_id, &document.file_name);
        save_results(&reachable, &path)
            .await
            .map_err(|e| TelegramError::FileProcessing(e.to_string()))?;

        info!(
            "Checked {} for chat {}: {} reachable",
            document.file_id,
            chat_id,
            reachable.len()
        );
        Ok(path)
    }
}

/// Reduce a user-supplied file name to a safe single path component
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        cleaned
    }
}
