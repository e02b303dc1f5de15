//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → round_robin.rs (advance shared cursor, ask breaker for permission)
//!     → pool.rs (fixed, ordered backends)
//!     → backend.rs (address + circuit breaker)
//!     → Return backend or "no eligible backend"
//! ```
//!
//! # Design Decisions
//! - Pool is immutable after startup; only cursor and breakers mutate
//! - Cursor always advances, so skipped backends do not bias rotation
//! - A selection scans the pool at most once
//! - Circuit gauges are republished on an interval so idle backends do not report stale state

pub mod backend;
pub mod pool;
pub mod round_robin;
pub mod state_publisher;

pub use backend::{BackendInstance, BackendStatus};
pub use pool::BackendPool;
pub use round_robin::RoundRobin;
pub use state_publisher::StatePublisher;
