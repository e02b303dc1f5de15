//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → circuit_breaker.rs (may this backend be called now?)
//!     → outbound call
//!     → circuit_breaker.rs (record success or failure)
//! ```
//!
//! # Design Decisions
//! - One breaker per backend; breakers never contend with each other
//! - No retries and no backoff: one attempt per inbound request

pub mod circuit_breaker;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState, Permission};
