//! Proxy list parsing

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

/// A proxy endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyEndpoint {
    /// Host name or IP address (IPv6 without brackets)
    pub host: String,
    pub port: u16,
}

impl ProxyEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse a single `host:port` entry
    ///
    /// Accepts an optional `scheme://` prefix, `user:pass@` credentials and
    /// bracketed IPv6 hosts (`[::1]:8080`). A trailing path is ignored.
    pub fn parse(entry: &str) -> Option<Self> {
        let mut rest = entry.trim();
        if let Some((_, after_scheme)) = rest.split_once("://") {
            rest = after_scheme;
        }
        if let Some((_, after_credentials)) = rest.rsplit_once('@') {
            rest = after_credentials;
        }
        if let Some((authority, _)) = rest.split_once('/') {
            rest = authority;
        }

        let (host, port) = rest.rsplit_once(':')?;
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        if host.is_empty() || host.contains(char::is_whitespace) {
            return None;
        }

        let port: u16 = port.parse().ok().filter(|p| *p != 0)?;
        Some(Self::new(host, port))
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Parse a proxy list, one endpoint per line
///
/// Blank lines and `#` comments are skipped, as are lines that do not parse.
/// Duplicates are dropped, keeping the first occurrence.
pub fn parse_proxy_list(text: &str) -> Vec<ProxyEndpoint> {
    let mut seen = HashSet::new();
    let mut endpoints = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match ProxyEndpoint::parse(line) {
            Some(endpoint) => {
                if seen.insert(endpoint.clone()) {
                    endpoints.push(endpoint);
                }
            }
            None => debug!("Skipping invalid proxy entry on line {}: {}", line_no + 1, line),
        }
    }

    endpoints
}
