//! Response rewriting for stage-prefixed deployments.
//!
//! # Responsibilities
//! - Point `Location` redirects at the public host and stage instead of the
//!   internal origin
//! - Prefix root-relative and parent-relative references in text bodies with
//!   the stage
//! - Base64-encode image bodies, leaving them otherwise untouched
//!
//! # Design Decisions
//! - Header names arrive canonicalized, so `Location` and `Content-Type` are
//!   matched exactly
//! - Text rules run through one ordered [`Replacer`] pass; a sequence of
//!   independent replaces would re-prefix `"/stage/` on the second rule

pub mod replacer;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::gateway::OutboundResponse;
use crate::upstream::OriginResponse;

pub use replacer::Replacer;

/// Header whose values are redirect targets.
pub const LOCATION: &str = "Location";
/// Header inspected to detect binary image bodies.
pub const CONTENT_TYPE: &str = "Content-Type";

/// Everything the rewriter needs to know about where a response is served.
#[derive(Debug, Clone)]
pub struct RewriteContext<'a> {
    /// Host name of the origin URL (no scheme, no port).
    pub origin_host: &'a str,
    /// `Host` header the client used to reach the gateway.
    pub public_host: &'a str,
    /// Stage prefix, without slashes.
    pub stage: &'a str,
}

impl RewriteContext<'_> {
    /// Rewrites `http://<origin>` to `https://<public host>/<stage>`.
    pub fn location_replacer(&self) -> Replacer {
        Replacer::new([(
            format!("http://{}", self.origin_host),
            format!("https://{}/{}", self.public_host, self.stage),
        )])
    }

    /// Prefixes quoted `../` and `/` references with `/<stage>/`.
    pub fn body_replacer(&self) -> Replacer {
        let prefix = format!("/{}/", self.stage);
        Replacer::new([
            ("\"../".to_string(), format!("\"{prefix}")),
            ("'../".to_string(), format!("'{prefix}")),
            ("\"/".to_string(), format!("\"{prefix}")),
            ("'/".to_string(), format!("'{prefix}")),
        ])
    }
}

/// Whether a content type denotes a body that must be base64-encoded.
pub fn is_binary_content(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.contains("image"))
}

/// Turn an origin response into the response handed to the event source.
///
/// An empty origin body yields a response with an empty body; callers rely
/// on that to skip caching.
pub fn rewrite_response(origin: OriginResponse, ctx: &RewriteContext<'_>) -> OutboundResponse {
    let OriginResponse {
        status,
        mut headers,
        body,
    } = origin;

    if let Some(locations) = headers.get_mut(LOCATION) {
        let replacer = ctx.location_replacer();
        for location in locations.iter_mut() {
            *location = replacer.replace(location);
        }
    }

    let mut response = OutboundResponse {
        status_code: status,
        multi_value_headers: headers,
        body: String::new(),
        is_base64_encoded: false,
    };

    if body.is_empty() {
        return response;
    }

    if is_binary_content(response.first_header(CONTENT_TYPE)) {
        response.body = STANDARD.encode(&body);
        response.is_base64_encoded = true;
    } else {
        response.body = ctx.body_replacer().replace(&String::from_utf8_lossy(&body));
    }

    response
}
