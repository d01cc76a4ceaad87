//! Outbound HTTP client routed through the forward proxy.
//!
//! # Responsibilities
//! - Translate an inbound request into a request against the origin
//! - Route it through the current forward proxy, or directly when the proxy
//!   URL does not parse
//! - Never follow redirects; a 3xx is handed back as-is
//! - Buffer the whole response body
//!
//! # Design Decisions
//! - Clients are built lazily and reused so connection pools survive across
//!   requests. Only two are kept: the direct client and the one for the
//!   current proxy URL; switching proxies drops the previous proxy's client
//! - Every call is bounded by connect and total timeouts
//! - No retries

use std::time::{Duration, Instant};

use dashmap::DashMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Proxy};
use url::Url;

use crate::config::TimeoutConfig;
use crate::error::ForwardError;
use crate::gateway::{canonical_header_name, InboundRequest, MultiValueHeaders};
use crate::observability::metrics;

/// Inbound headers the HTTP client sets itself and never copies.
const SKIPPED_HEADERS: &[&str] = &[
    "host",
    "content-length",
    "transfer-encoding",
    "trailer",
    "accept-encoding",
];

/// Cache key of the client used when no valid proxy is configured.
const DIRECT: &str = "";

/// A fully built request against the origin.
#[derive(Debug)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl UpstreamRequest {
    /// Build the origin request: same method, headers and body, target
    /// `base_url + path`. The query string is not forwarded.
    pub fn from_inbound(inbound: &InboundRequest, base_url: &str) -> Result<Self, ForwardError> {
        let method = if inbound.method.is_empty() {
            Method::GET
        } else {
            Method::from_bytes(inbound.method.as_bytes())
                .map_err(|_| ForwardError::Build(format!("invalid method '{}'", inbound.method)))?
        };

        let target = format!("{}{}", base_url, inbound.path);
        let url = Url::parse(&target)
            .map_err(|e| ForwardError::Build(format!("invalid target URL '{}': {}", target, e)))?;

        let mut headers = HeaderMap::new();
        for (name, values) in &inbound.headers {
            if SKIPPED_HEADERS.iter().any(|s| name.eq_ignore_ascii_case(s)) {
                continue;
            }
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ForwardError::Build(format!("invalid header name '{}'", name)))?;
            for value in values {
                let header_value = HeaderValue::from_str(value)
                    .map_err(|_| ForwardError::Build(format!("invalid value for header '{}'", name)))?;
                headers.append(header_name.clone(), header_value);
            }
        }

        Ok(Self {
            method,
            url,
            headers,
            body: inbound.body.clone(),
        })
    }

    /// Host name of the target, as it appears in absolute origin URLs.
    pub fn origin_host(&self) -> &str {
        self.url
            .host_str()
            .unwrap_or_default()
            .trim_start_matches('[')
            .trim_end_matches(']')
    }
}

/// Raw origin response with canonicalized header names.
#[derive(Debug, Clone, Default)]
pub struct OriginResponse {
    pub status: u16,
    pub headers: MultiValueHeaders,
    pub body: Vec<u8>,
}

/// Issues origin requests through a forward proxy.
pub struct Forwarder {
    clients: DashMap<String, Client>,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        Self {
            clients: DashMap::new(),
            connect_timeout: Duration::from_secs(timeouts.connect_secs),
            request_timeout: Duration::from_secs(timeouts.request_secs),
        }
    }

    /// Send `request` via `proxy_url` and buffer the response.
    pub async fn send(
        &self,
        request: UpstreamRequest,
        proxy_url: &str,
    ) -> Result<OriginResponse, ForwardError> {
        let client = self.client_for(proxy_url)?;
        let UpstreamRequest {
            method,
            url,
            headers,
            body,
        } = request;

        tracing::info!(method = %method, url = %url, proxy = %proxy_url, "Forwarding to origin");

        let start = Instant::now();
        let mut response = client
            .request(method, url.clone())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Upstream request failed");
                ForwardError::from(e)
            })?;

        let status = response.status().as_u16();
        metrics::record_upstream(status, start);
        if status > 399 {
            tracing::warn!(url = %url, status, "Expecting 2xx-3xx response from origin");
        }

        let mut headers = MultiValueHeaders::new();
        for name in response.headers().keys() {
            let values = response
                .headers()
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect();
            headers.insert(canonical_header_name(name.as_str()), values);
        }

        let mut body = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => body.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(
                        url = %url,
                        error = %e,
                        read = body.len(),
                        "Error reading response body, continuing with partial body"
                    );
                    break;
                }
            }
        }

        Ok(OriginResponse {
            status,
            headers,
            body,
        })
    }

    /// Client routed through `proxy_url`, or a direct client when the URL is
    /// not a usable proxy.
    fn client_for(&self, proxy_url: &str) -> Result<Client, ForwardError> {
        let proxy = match Proxy::all(proxy_url) {
            Ok(proxy) => Some(proxy),
            Err(e) => {
                tracing::warn!(
                    proxy = %proxy_url,
                    error = %e,
                    "Error parsing forward proxy, connecting to origin directly"
                );
                None
            }
        };

        let key = if proxy.is_some() { proxy_url } else { DIRECT };
        if let Some(client) = self.clients.get(key) {
            return Ok(client.value().clone());
        }

        let builder = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout);
        let builder = match proxy {
            Some(proxy) => builder.proxy(proxy),
            None => builder.no_proxy(),
        };
        let client = builder
            .build()
            .map_err(|e| ForwardError::Build(format!("cannot build HTTP client: {}", e)))?;

        if key != DIRECT {
            self.clients.retain(|k, _| k == DIRECT);
        }
        self.clients.insert(key.to_string(), client.clone());
        Ok(client)
    }
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("clients", &self.clients.len())
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
