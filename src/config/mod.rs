//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → breaker / dispatch / timeout settings handed to the core at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once; the backend pool never changes while running
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, CircuitBreakerSettings, DispatchSettings, ListenerConfig, ObservabilityConfig,
    PoolConfig, RouterConfig, TimeoutConfig,
};
pub use validation::ValidationError;
