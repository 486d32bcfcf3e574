//! courier-proxy: proxy list verification
//!
//! Downloads a list of `host:port` proxy endpoints, checks which ones
//! accept TCP connections, and writes the reachable ones to a result file.

pub mod checker;
pub mod error;
pub mod parser;
pub mod store;

pub use checker::{ProxyCheck, ProxyChecker};
pub use error::{ProxyError, Result};
pub use parser::{parse_proxy_list, ProxyEndpoint};
pub use store::save_results;
