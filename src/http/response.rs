//! Response handling on the HTTP front.
//!
//! # Responsibilities
//! - Turn an adapter response back into an HTTP response
//! - Map adapter errors to status codes with a small JSON error body
//!
//! # Design Decisions
//! - Framing headers from the origin are dropped; rewritten bodies change
//!   length and hyper frames the response itself
//! - Base64 bodies are decoded before they are sent

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use crate::error::{AdapterError, ForwardError};
use crate::gateway::OutboundResponse;

/// Origin headers not copied onto the front response.
const FRAMING_HEADERS: &[&str] = &["content-length", "transfer-encoding", "connection"];

/// Error payload in the shape gateway runtimes use for function errors.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_type: &'static str,
    pub error_message: String,
}

/// Status code used when an adapter error reaches the front.
pub fn error_status(err: &AdapterError) -> StatusCode {
    match err {
        AdapterError::InvalidEvent(_) => StatusCode::BAD_REQUEST,
        AdapterError::Forward(ForwardError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        AdapterError::Forward(_) => StatusCode::BAD_GATEWAY,
        AdapterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: &AdapterError) -> Response {
    let body = ErrorBody {
        error_type: err.kind(),
        error_message: err.to_string(),
    };
    (error_status(err), Json(body)).into_response()
}

/// Convert an adapter response into an HTTP response.
pub fn into_http_response(response: OutboundResponse) -> Response {
    let status = StatusCode::from_u16(response.status_code).unwrap_or_else(|_| {
        tracing::warn!(status = response.status_code, "Origin returned an invalid status code");
        StatusCode::BAD_GATEWAY
    });

    let body = if response.is_base64_encoded {
        match STANDARD.decode(response.body.as_bytes()) {
            Ok(bytes) => Body::from(bytes),
            Err(e) => {
                tracing::error!(error = %e, "Cannot decode base64 response body");
                return error_response(&AdapterError::Internal(format!(
                    "response body is not valid base64: {}",
                    e
                )));
            }
        }
    } else {
        Body::from(response.body)
    };

    let mut http_response = Response::new(body);
    *http_response.status_mut() = status;

    let headers = http_response.headers_mut();
    for (name, values) in &response.multi_value_headers {
        if FRAMING_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h)) {
            continue;
        }
        let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) else {
            tracing::warn!(header = %name, "Dropping response header with invalid name");
            continue;
        };
        for value in values {
            match HeaderValue::from_str(value) {
                Ok(v) => {
                    headers.append(header_name.clone(), v);
                }
                Err(_) => tracing::warn!(header = %name, "Dropping invalid response header value"),
            }
        }
    }

    http_response
}
