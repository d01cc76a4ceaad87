//! Stage-prefix forwarding adapter.
//!
//! Relays gateway events to a fixed origin through a forward proxy and
//! rewrites responses so they work when served under a stage prefix.

pub mod adapter;
pub mod admin;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;
pub mod upstream;

pub use adapter::Adapter;
pub use config::RelayConfig;
pub use error::{AdapterError, ForwardError};
pub use gateway::{GatewayRequest, InboundRequest, OutboundResponse};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
