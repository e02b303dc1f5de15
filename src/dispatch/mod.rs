//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound payload
//!     → dispatcher.rs (select backend, one outbound call)
//!     → upstream.rs (send to backend address, measure elapsed)
//!     → classify.rs (connection failure / slow / error status / success)
//!     → breaker updated, outcome returned
//! ```

pub mod classify;
pub mod dispatcher;
pub mod upstream;

pub use classify::{FailureReason, RouteClass, Verdict};
pub use dispatcher::{DispatchConfig, Dispatcher, RouteOutcome, UNAVAILABLE_MESSAGE};
pub use upstream::{HyperUpstream, Payload, Upstream, UpstreamError, UpstreamResponse};
