//! HTTP front: a local stand-in for the gateway runtime.
//!
//! # Data Flow
//! ```text
//! HTTP request ─┬─ POST invocation path → JSON GatewayRequest
//!               └─ any other path ──────→ request.rs (event from HTTP)
//!     → adapter (directives, cache, forward, rewrite)
//!     → response.rs (HTTP from OutboundResponse, or JSON for invocations)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer, INVOKE_PATH};
