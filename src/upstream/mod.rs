//! Origin forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! InboundRequest + base URL
//!     → UpstreamRequest (method, target URL, copied headers, body)
//!     → Forwarder (client for the current proxy URL)
//!     → OriginResponse (status, canonical headers, buffered body)
//! ```

pub mod forwarder;

pub use forwarder::{Forwarder, OriginResponse, UpstreamRequest};
