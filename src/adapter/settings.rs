//! Runtime proxy settings.
//!
//! The origin base URL is fixed at startup. The forward-proxy URL lives in an
//! `ArcSwap` so request handlers read it without locking while directives
//! replace it with read-copy-update.

use std::sync::Arc;

use arc_swap::ArcSwap;

/// Outcome of a `port` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortChange {
    /// The port segment was replaced.
    Applied { from: String, to: String },
    /// The proxy URL did not have exactly three colon-separated segments.
    Rejected { proxy_url: String, segments: usize },
}

/// Origin and forward-proxy URLs shared by all requests.
#[derive(Debug)]
pub struct ProxySettings {
    base_url: String,
    proxy_url: ArcSwap<String>,
}

impl ProxySettings {
    pub fn new(base_url: impl Into<String>, proxy_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            proxy_url: ArcSwap::from_pointee(proxy_url.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Snapshot of the current forward-proxy URL.
    pub fn proxy_url(&self) -> Arc<String> {
        self.proxy_url.load_full()
    }

    /// Replace the forward-proxy URL, returning the previous one.
    pub fn set_proxy_url(&self, proxy_url: impl Into<String>) -> Arc<String> {
        self.proxy_url.swap(Arc::new(proxy_url.into()))
    }

    /// Replace the port of the current forward-proxy URL.
    pub fn set_proxy_port(&self, port: &str) -> PortChange {
        let mut change = None;
        self.proxy_url.rcu(|current| match replace_port(current, port) {
            Some(next) => {
                change = Some(PortChange::Applied {
                    from: current.to_string(),
                    to: next.clone(),
                });
                Arc::new(next)
            }
            None => {
                change = Some(PortChange::Rejected {
                    proxy_url: current.to_string(),
                    segments: current.split(':').count(),
                });
                Arc::clone(current)
            }
        });
        // rcu always runs the closure at least once.
        change.unwrap_or(PortChange::Rejected {
            proxy_url: String::new(),
            segments: 0,
        })
    }
}

/// Swap the third colon-separated segment of `proxy_url` for `port`.
///
/// Only `scheme://host:port` shaped values qualify; anything splitting into
/// more or fewer than three segments yields `None`.
pub fn replace_port(proxy_url: &str, port: &str) -> Option<String> {
    let segments: Vec<&str> = proxy_url.split(':').collect();
    match segments.as_slice() {
        [scheme, host, _] => Some(format!("{scheme}:{host}:{port}")),
        _ => None,
    }
}
