//! Proxy reachability checker

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

use courier_core::ProxyConfig;

use crate::error::{ProxyError, Result};
use crate::parser::{parse_proxy_list, ProxyEndpoint};

/// A reachable proxy endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCheck {
    pub endpoint: ProxyEndpoint,
    /// Time taken to establish the TCP connection
    pub latency: Duration,
    pub checked_at: DateTime<Utc>,
}

/// Checks proxy endpoints by opening a TCP connection to each
#[derive(Clone)]
pub struct ProxyChecker {
    client: Client,
    connect_timeout: Duration,
    concurrency: usize,
}

impl ProxyChecker {
    /// Create a new checker
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        if config.concurrency == 0 {
            return Err(ProxyError::Config(
                "concurrency must be greater than zero".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            concurrency: config.concurrency,
        })
    }

    /// Download a proxy list as text
    pub async fn download_list(&self, url: &str) -> Result<String> {
        // Download URLs embed the bot token, keep them out of errors
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProxyError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::Download(format!("server returned {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| ProxyError::Http(e.without_url()))
    }

    /// Check a single endpoint, returning `None` when it is unreachable
    pub async fn check_endpoint(&self, endpoint: ProxyEndpoint) -> Option<ProxyCheck> {
        let started = Instant::now();
        let target = (endpoint.host.clone(), endpoint.port);

        match timeout(self.connect_timeout, TcpStream::connect(target)).await {
            Ok(Ok(_stream)) => Some(ProxyCheck {
                latency: started.elapsed(),
                endpoint,
                checked_at: Utc::now(),
            }),
            Ok(Err(e)) => {
                debug!("{} unreachable: {}", endpoint, e);
                None
            }
            Err(_) => {
                debug!("{} timed out", endpoint);
                None
            }
        }
    }

    /// Check all endpoints concurrently
    ///
    /// Returns the reachable ones, fastest first.
    pub async fn check_all(&self, endpoints: Vec<ProxyEndpoint>) -> Vec<ProxyCheck> {
        let mut reachable: Vec<ProxyCheck> = stream::iter(endpoints)
            .map(|endpoint| self.check_endpoint(endpoint))
            .buffer_unordered(self.concurrency)
            .filter_map(|result| async move { result })
            .collect()
            .await;

        reachable.sort_by_key(|check| check.latency);
        reachable
    }

    /// Download the list at `url` and check every endpoint in it
    pub async fn check_url(&self, url: &str) -> Result<Vec<ProxyCheck>> {
        let text = self.download_list(url).await?;
        let endpoints = parse_proxy_list(&text);
        let total = endpoints.len();

        info!("Checking {} proxy endpoints", total);
        let reachable = self.check_all(endpoints).await;
        info!("{} of {} proxy endpoints reachable", reachable.len(), total);

        Ok(reachable)
    }
}
