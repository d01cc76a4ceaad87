//! Gateway proxy-event wire format.
//!
//! Mirrors the JSON an API-gateway style runtime hands to a function: the
//! fields the adapter needs are modelled, everything else is ignored.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;
use crate::gateway::types::{InboundRequest, MultiValueHeaders};

/// Inbound gateway event.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayRequest {
    pub http_method: String,
    pub path: String,
    pub query_string_parameters: Option<HashMap<String, String>>,
    pub headers: Option<HashMap<String, String>>,
    pub multi_value_headers: Option<MultiValueHeaders>,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
    pub request_context: RequestContext,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestContext {
    pub stage: String,
    pub request_id: Option<String>,
}

impl TryFrom<GatewayRequest> for InboundRequest {
    type Error = AdapterError;

    fn try_from(event: GatewayRequest) -> Result<Self, Self::Error> {
        let single = event.headers.unwrap_or_default();

        let host = single
            .get("Host")
            .cloned()
            .or_else(|| {
                event
                    .multi_value_headers
                    .as_ref()
                    .and_then(|m| m.get("Host"))
                    .and_then(|v| v.first().cloned())
            })
            .unwrap_or_default();

        // Multi-value headers are authoritative; the single-value map only
        // stands in when a runtime omits them.
        let headers = match event.multi_value_headers {
            Some(multi) => multi,
            None => single.into_iter().map(|(k, v)| (k, vec![v])).collect(),
        };

        let body = match event.body {
            Some(body) if event.is_base64_encoded => STANDARD
                .decode(body.as_bytes())
                .map_err(|e| AdapterError::InvalidEvent(format!("body is not valid base64: {}", e)))?,
            Some(body) => body.into_bytes(),
            None => Vec::new(),
        };

        Ok(InboundRequest {
            method: event.http_method,
            path: event.path,
            query: event.query_string_parameters.unwrap_or_default(),
            headers,
            body,
            stage: event.request_context.stage,
            host,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT: &str = r#"{
        "resource": "/{proxy+}",
        "path": "/rpSys.html",
        "httpMethod": "GET",
        "headers": { "Host": "api.example.com", "Accept": "text/html" },
        "multiValueHeaders": {
            "Host": ["api.example.com"],
            "Accept": ["text/html"],
            "Cookie": ["a=1", "b=2"]
        },
        "queryStringParameters": { "port": "9999" },
        "requestContext": { "stage": "prod", "requestId": "abc" },
        "body": null,
        "isBase64Encoded": false
    }"#;

    #[test]
    fn test_decode_gateway_event() {
        let event: GatewayRequest = serde_json::from_str(EVENT).unwrap();
        let request = InboundRequest::try_from(event).unwrap();

        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/rpSys.html");
        assert_eq!(request.stage, "prod");
        assert_eq!(request.host, "api.example.com");
        assert_eq!(request.query_param("port"), Some("9999"));
        assert_eq!(request.headers["Cookie"], vec!["a=1", "b=2"]);
        assert!(request.body.is_empty());
    }

    #[test]
    fn test_null_collections() {
        let event: GatewayRequest = serde_json::from_str(
            r#"{"httpMethod":"POST","path":"/","queryStringParameters":null,
                "multiValueHeaders":null,"headers":null,"body":"a=1"}"#,
        )
        .unwrap();
        let request = InboundRequest::try_from(event).unwrap();

        assert!(request.query.is_empty());
        assert!(request.headers.is_empty());
        assert_eq!(request.host, "");
        assert_eq!(request.body, b"a=1");
    }

    #[test]
    fn test_single_value_headers_fallback() {
        let event = GatewayRequest {
            http_method: "GET".into(),
            path: "/".into(),
            headers: Some(HashMap::from([("Host".to_string(), "h.example".to_string())])),
            ..Default::default()
        };
        let request = InboundRequest::try_from(event).unwrap();
        assert_eq!(request.headers["Host"], vec!["h.example"]);
        assert_eq!(request.host, "h.example");
    }

    #[test]
    fn test_base64_body() {
        let event = GatewayRequest {
            http_method: "POST".into(),
            path: "/upload".into(),
            body: Some("AAEC".into()),
            is_base64_encoded: true,
            ..Default::default()
        };
        let request = InboundRequest::try_from(event).unwrap();
        assert_eq!(request.body, vec![0u8, 1, 2]);

        let bad = GatewayRequest {
            body: Some("***".into()),
            is_base64_encoded: true,
            ..Default::default()
        };
        assert!(matches!(
            InboundRequest::try_from(bad),
            Err(AdapterError::InvalidEvent(_))
        ));
    }
}
