//! The forwarding adapter.
//!
//! # State Machine
//! ```text
//! START → DIRECTIVE_CHECK → CACHE_CHECK ─┬─ hit  → return cached
//!                                        └─ miss → FORWARD → REWRITE
//!                                                  → (CACHE_STORE if cacheable)
//!                                                  → return
//! ```
//! Terminal states are a response or an [`AdapterError`].
//!
//! # Design Decisions
//! - `Adapter` owns all shared state (proxy settings, cache, clients) and is
//!   shared by reference; nothing is global
//! - Faults inside a request are caught by [`Adapter::handle_supervised`],
//!   logged and returned as `AdapterError::Internal`; the process keeps
//!   serving

pub mod directives;
pub mod settings;

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures_util::FutureExt;

use crate::cache::ResponseCache;
use crate::config::RelayConfig;
use crate::error::{AdapterError, AdapterResult};
use crate::gateway::{GatewayRequest, InboundRequest, OutboundResponse};
use crate::observability::metrics;
use crate::rewrite::{rewrite_response, RewriteContext};
use crate::upstream::{Forwarder, UpstreamRequest};

pub use directives::apply_directives;
pub use settings::{PortChange, ProxySettings};

/// Request-forwarding adapter with its process-wide state.
#[derive(Debug)]
pub struct Adapter {
    settings: ProxySettings,
    cache: ResponseCache,
    forwarder: Forwarder,
}

impl Adapter {
    /// Create an adapter seeded from the startup configuration.
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            settings: ProxySettings::new(
                config.upstream.base_url.clone(),
                config.upstream.proxy_url.clone(),
            ),
            cache: ResponseCache::new(),
            forwarder: Forwarder::new(&config.timeouts),
        }
    }

    pub fn settings(&self) -> &ProxySettings {
        &self.settings
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Decode a gateway event and handle it under supervision.
    pub async fn handle_event(&self, event: GatewayRequest) -> AdapterResult<OutboundResponse> {
        let request = InboundRequest::try_from(event)?;
        self.handle_supervised(&request).await
    }

    /// [`Adapter::handle`], with panics converted into `AdapterError::Internal`.
    pub async fn handle_supervised(&self, request: &InboundRequest) -> AdapterResult<OutboundResponse> {
        supervise(self.handle(request), request).await
    }

    /// Run one request through directives, cache, forwarder and rewriter.
    pub async fn handle(&self, request: &InboundRequest) -> AdapterResult<OutboundResponse> {
        let start = Instant::now();
        let result = self.process(request).await;
        if let Err(e) = &result {
            tracing::error!(path = %request.path, error = %e, "Request failed");
            metrics::record_request("error", start);
        }
        result
    }

    async fn process(&self, request: &InboundRequest) -> AdapterResult<OutboundResponse> {
        let start = Instant::now();

        apply_directives(request, &self.settings, &self.cache);

        if let Some(cached) = self.cache.get(&request.path) {
            tracing::info!(method = %request.method, path = %request.path, "Serving cached response");
            metrics::record_request("cache_hit", start);
            return Ok(cached);
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            stage = %request.stage,
            host = %request.host,
            headers = request.headers.len(),
            body_bytes = request.body.len(),
            "Handling request"
        );

        let upstream = UpstreamRequest::from_inbound(request, self.settings.base_url())?;
        let origin_host = upstream.origin_host().to_string();
        let proxy_url = self.settings.proxy_url();
        let origin = self.forwarder.send(upstream, &proxy_url).await?;

        let ctx = RewriteContext {
            origin_host: &origin_host,
            public_host: &request.host,
            stage: &request.stage,
        };
        let response = rewrite_response(origin, &ctx);

        if response.body.is_empty() {
            tracing::debug!(path = %request.path, status = response.status_code, "Empty origin body");
        } else if self.cache.store(&request.path, &response) {
            tracing::debug!(path = %request.path, "Response cached");
        }

        metrics::record_request("forwarded", start);
        Ok(response)
    }
}

/// Run `fut`, turning a panic into `AdapterError::Internal`.
async fn supervise<F, T>(fut: F, request: &InboundRequest) -> AdapterResult<T>
where
    F: Future<Output = AdapterResult<T>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!(
                method = %request.method,
                path = %request.path,
                panic = %message,
                "Handler fault"
            );
            metrics::record_fault();
            Err(AdapterError::Internal(message))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
