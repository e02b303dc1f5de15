//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend Application API instance
//! - Own that instance's circuit breaker
//! - Log and export breaker transitions

use serde::Serialize;

use crate::observability::metrics;
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState, Permission};

/// A single backend instance and its circuit breaker.
#[derive(Debug)]
pub struct BackendInstance {
    /// Position in the pool. Distinguishes duplicate addresses.
    index: usize,
    /// Where requests for this backend are sent. Opaque to the core.
    address: String,
    breaker: CircuitBreaker,
}

impl BackendInstance {
    pub fn new(index: usize, address: impl Into<String>, breaker: CircuitBreakerConfig) -> Self {
        Self {
            index,
            address: address.into(),
            breaker: CircuitBreaker::new(breaker),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Ask the breaker for permission. May close an open circuit whose cooldown elapsed.
    pub fn acquire_permission(&self) -> bool {
        let permission = self.breaker.try_acquire();
        if permission == Permission::Reset {
            tracing::info!(address = %self.address, index = self.index, "Circuit closed after reset timeout");
            self.publish_state(CircuitState::Closed);
        }
        permission.is_granted()
    }

    /// Record a failed call against this backend.
    pub fn report_failure(&self) {
        let failures = self.breaker.report_failure();
        if failures == self.breaker.config().failure_threshold {
            tracing::warn!(
                address = %self.address,
                index = self.index,
                consecutive_failures = failures,
                "Circuit opened"
            );
            self.publish_state(CircuitState::Open);
        }
    }

    /// Record a successful call against this backend.
    pub fn report_success(&self) {
        if self.breaker.report_success() {
            tracing::info!(address = %self.address, index = self.index, "Circuit closed after successful call");
            self.publish_state(CircuitState::Closed);
        }
    }

    /// Export the breaker's current read-only state.
    pub fn refresh_gauge(&self) {
        self.publish_state(self.breaker.state());
    }

    fn publish_state(&self, state: CircuitState) {
        metrics::record_circuit_state(self.index, &self.address, state);
    }

    /// Read-only status for the admin snapshot.
    pub fn status(&self) -> BackendStatus {
        BackendStatus {
            address: self.address.clone(),
            state: self.breaker.state().as_str(),
            consecutive_failures: self.breaker.consecutive_failures(),
        }
    }
}

/// Serializable view of a backend's breaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    pub address: String,
    pub state: &'static str,
    pub consecutive_failures: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_delegates_to_breaker() {
        let backend = BackendInstance::new(0, "http://api1.example.com", CircuitBreakerConfig::default());
        assert_eq!(backend.address(), "http://api1.example.com");
        assert!(backend.acquire_permission());

        for _ in 0..3 {
            backend.report_failure();
        }
        assert!(!backend.acquire_permission());

        let status = backend.status();
        assert_eq!(status.state, "open");
        assert_eq!(status.consecutive_failures, 3);

        backend.report_success();
        assert!(backend.acquire_permission());
        assert_eq!(backend.status().state, "closed");
    }

    #[test]
    fn test_each_backend_owns_its_breaker() {
        let config = CircuitBreakerConfig::default();
        let a = BackendInstance::new(0, "http://same.example.com", config);
        let b = BackendInstance::new(1, "http://same.example.com", config);

        for _ in 0..3 {
            a.report_failure();
        }
        assert!(!a.acquire_permission());
        assert!(b.acquire_permission());
        assert_eq!((a.index(), b.index()), (0, 1));
    }
}
