//! Round-robin HTTP request router with per-backend circuit breakers.

pub mod admin;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod resilience;

pub use config::RouterConfig;
pub use dispatch::{Dispatcher, RouteOutcome};
pub use error::RouterError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
