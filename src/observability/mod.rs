//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, selector and breakers produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) is attached to every HTTP span
//! - Metrics are cheap and safe to call without a recorder

pub mod logging;
pub mod metrics;
