//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! adapter, front, admin
//!     → logging.rs (tracing subscriber, structured fields)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Every front response carries its request ID (`x-request-id`)
//! - Metrics are cheap (atomic increments) and optional

pub mod logging;
pub mod metrics;
