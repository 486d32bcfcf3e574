//! Result file output

use std::path::Path;

use chrono::Utc;
use tokio::fs;
use tracing::info;

use crate::checker::ProxyCheck;
use crate::error::Result;

/// Write reachable proxies to `path`, one `host:port` per line
///
/// The file starts with a `#` comment line so it can be fed straight back
/// into [`parse_proxy_list`](crate::parse_proxy_list). Parent directories are
/// created as needed and an existing file is replaced.
pub async fn save_results(results: &[ProxyCheck], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let mut content = format!(
        "# {} reachable proxies, checked at {}\n",
        results.len(),
        Utc::now().to_rfc3339()
    );
    for check in results {
        content.push_str(&check.endpoint.to_string());
        content.push('\n');
    }

    fs::write(path, content).await?;
    info!("Saved {} proxies to {}", results.len(), path.display());

    Ok(())
}
