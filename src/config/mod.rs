//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! compiled-in defaults
//!     → loader.rs (optional TOML file)
//!     → loader.rs (BASE_URL / HTTP_PROXY environment overrides)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, read once at startup)
//!     → seeds the runtime ProxySettings owned by the Adapter
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the forward-proxy URL changes at
//!   runtime, and that lives in `adapter::ProxySettings`, not here
//! - All fields have defaults to allow running with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, LoadedConfig};
pub use schema::{
    AdminConfig, ListenerConfig, ObservabilityConfig, RelayConfig, TimeoutConfig, UpstreamConfig,
};
