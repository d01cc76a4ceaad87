//! Request handling on the HTTP front.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every front request
//! - Translate a plain HTTP request into the gateway event the adapter
//!   consumes, stripping the stage prefix from the path
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Query strings collapse to a single-value map, last value wins, the way
//!   gateway runtimes populate `queryStringParameters`
//! - Non-UTF-8 bodies travel base64-encoded with `isBase64Encoded` set

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::gateway::{canonical_header_name, GatewayRequest, MultiValueHeaders, RequestContext};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Errors translating a front request into an event.
#[derive(Debug, thiserror::Error)]
pub enum FrontError {
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
}

/// Remove a leading `/<stage>` segment from `path`.
pub fn strip_stage<'a>(path: &'a str, stage: &str) -> &'a str {
    if stage.is_empty() {
        return path;
    }
    match path.strip_prefix('/').and_then(|p| p.strip_prefix(stage)) {
        Some("") => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

/// Build the gateway event for a front request.
pub async fn to_gateway_event(
    request: Request<Body>,
    stage: &str,
    max_body_bytes: usize,
) -> Result<GatewayRequest, FrontError> {
    let (parts, body) = request.into_parts();

    let path = strip_stage(parts.uri.path(), stage).to_string();

    let query: HashMap<String, String> = parts
        .uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    let mut multi_value_headers = MultiValueHeaders::new();
    let mut headers = HashMap::new();
    for name in parts.headers.keys() {
        let values: Vec<String> = parts
            .headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        let canonical = canonical_header_name(name.as_str());
        if let Some(last) = values.last() {
            headers.insert(canonical.clone(), last.clone());
        }
        multi_value_headers.insert(canonical, values);
    }
    // HTTP/2 carries the host in the :authority pseudo-header.
    if !headers.contains_key("Host") {
        if let Some(authority) = parts.uri.authority() {
            headers.insert("Host".to_string(), authority.to_string());
            multi_value_headers.insert("Host".to_string(), vec![authority.to_string()]);
        }
    }

    let request_id = headers.get("X-Request-Id").cloned();

    let bytes = axum::body::to_bytes(body, max_body_bytes)
        .await
        .map_err(|_| FrontError::BodyTooLarge {
            limit: max_body_bytes,
        })?;
    let (body, is_base64_encoded) = if bytes.is_empty() {
        (None, false)
    } else {
        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => (Some(text), false),
            Err(_) => (Some(STANDARD.encode(&bytes)), true),
        }
    };

    Ok(GatewayRequest {
        http_method: parts.method.to_string(),
        path,
        query_string_parameters: Some(query),
        headers: Some(headers),
        multi_value_headers: Some(multi_value_headers),
        body,
        is_base64_encoded,
        request_context: RequestContext {
            stage: stage.to_string(),
            request_id,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InboundRequest;

    #[test]
    fn test_strip_stage() {
        assert_eq!(strip_stage("/prod/a/b.css", "prod"), "/a/b.css");
        assert_eq!(strip_stage("/prod", "prod"), "/");
        assert_eq!(strip_stage("/prod/", "prod"), "/");
        assert_eq!(strip_stage("/production/x", "prod"), "/production/x");
        assert_eq!(strip_stage("/other/x", "prod"), "/other/x");
        assert_eq!(strip_stage("/x", ""), "/x");
    }

    #[tokio::test]
    async fn test_to_gateway_event() {
        let request = Request::builder()
            .method("POST")
            .uri("/prod/help/index.html?port=9999&a=1&a=2")
            .header("host", "api.example.com")
            .header("cookie", "a=1")
            .header("cookie", "b=2")
            .header("x-request-id", "req-1")
            .body(Body::from("name=value"))
            .unwrap();

        let event = to_gateway_event(request, "prod", 1024).await.unwrap();
        assert_eq!(event.http_method, "POST");
        assert_eq!(event.path, "/help/index.html");
        assert_eq!(event.request_context.stage, "prod");
        assert_eq!(event.request_context.request_id.as_deref(), Some("req-1"));

        let inbound = InboundRequest::try_from(event).unwrap();
        assert_eq!(inbound.host, "api.example.com");
        assert_eq!(inbound.query_param("port"), Some("9999"));
        assert_eq!(inbound.query_param("a"), Some("2"));
        assert_eq!(inbound.headers["Cookie"], vec!["a=1", "b=2"]);
        assert_eq!(inbound.body, b"name=value");
    }

    #[tokio::test]
    async fn test_binary_body_is_base64() {
        let request = Request::builder()
            .uri("/upload")
            .body(Body::from(vec![0xffu8, 0xfe, 0x00]))
            .unwrap();

        let event = to_gateway_event(request, "prod", 1024).await.unwrap();
        assert!(event.is_base64_encoded);
        let inbound = InboundRequest::try_from(event).unwrap();
        assert_eq!(inbound.body, vec![0xffu8, 0xfe, 0x00]);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let request = Request::builder()
            .uri("/upload")
            .body(Body::from(vec![b'a'; 64]))
            .unwrap();

        let err = to_gateway_event(request, "prod", 16).await.unwrap_err();
        assert_eq!(err.to_string(), "request body exceeds 16 bytes");
    }
}
