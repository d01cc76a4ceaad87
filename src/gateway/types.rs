//! Request and response values flowing through the adapter.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Header map as carried by gateway events: name → ordered values.
pub type MultiValueHeaders = HashMap<String, Vec<String>>;

/// An inbound request, already decoded from its event form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    /// Keys are case-sensitive exactly as supplied by the event source.
    pub headers: MultiValueHeaders,
    pub body: Vec<u8>,
    /// Deployment path prefix, without slashes.
    pub stage: String,
    /// Externally visible `Host` header.
    pub host: String,
}

impl InboundRequest {
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

/// The response handed back to the event source.
///
/// Serializes directly to the gateway proxy-response shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundResponse {
    pub status_code: u16,
    #[serde(default)]
    pub multi_value_headers: MultiValueHeaders,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl OutboundResponse {
    /// First value of a header, matched exactly on the canonical name.
    pub fn first_header(&self, name: &str) -> Option<&str> {
        self.multi_value_headers
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// Canonical MIME form of a header name: `content-type` → `Content-Type`.
///
/// Names containing bytes that are not header token characters are returned
/// unchanged.
pub fn canonical_header_name(name: &str) -> String {
    if !name.bytes().all(is_token_byte) {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    out
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
