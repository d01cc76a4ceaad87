//! In-band reconfiguration directives.
//!
//! `proxy=<url>` and `port=<value>` query parameters change the forward proxy
//! for the rest of the process lifetime, not just the current request. Each
//! successful change also drops the cache entry for the request's path so
//! the request is served fresh through the new proxy.

use crate::adapter::settings::{PortChange, ProxySettings};
use crate::cache::ResponseCache;
use crate::gateway::InboundRequest;
use crate::observability::metrics;

/// Query parameter replacing the forward-proxy URL.
pub const PROXY_PARAM: &str = "proxy";
/// Query parameter replacing the forward-proxy port.
pub const PORT_PARAM: &str = "port";

/// Apply `proxy` then `port`, independently.
pub fn apply_directives(request: &InboundRequest, settings: &ProxySettings, cache: &ResponseCache) {
    if let Some(proxy) = request.query_param(PROXY_PARAM) {
        let previous = settings.set_proxy_url(proxy);
        tracing::info!(from = %previous, to = %proxy, "Forward proxy changed");
        metrics::record_directive(PROXY_PARAM);
        cache.invalidate(&request.path);
    }

    if let Some(port) = request.query_param(PORT_PARAM) {
        match settings.set_proxy_port(port) {
            PortChange::Applied { from, to } => {
                tracing::info!(port = %port, from = %from, to = %to, "Forward proxy port changed");
                metrics::record_directive(PORT_PARAM);
                cache.invalidate(&request.path);
            }
            PortChange::Rejected { proxy_url, segments } => {
                tracing::warn!(
                    port = %port,
                    proxy = %proxy_url,
                    segments,
                    "Port directive ignored, proxy URL is not scheme://host:port"
                );
            }
        }
    }
}
