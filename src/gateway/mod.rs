//! Event-source boundary.
//!
//! # Data Flow
//! ```text
//! runtime JSON event
//!     → event.rs (GatewayRequest, serde)
//!     → types.rs (InboundRequest, decoded body and host)
//!     → adapter
//!     → types.rs (OutboundResponse, serializes as the gateway response)
//! ```

pub mod event;
pub mod types;

pub use event::{GatewayRequest, RequestContext};
pub use types::{canonical_header_name, InboundRequest, MultiValueHeaders, OutboundResponse};
