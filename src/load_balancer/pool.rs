//! Backend pool.
//!
//! # Responsibilities
//! - Build the ordered list of backends once at startup
//! - Reject an empty address list
//! - Expose read-only access for selection and the admin snapshot

use crate::error::RouterError;
use crate::load_balancer::backend::{BackendInstance, BackendStatus};
use crate::resilience::CircuitBreakerConfig;

/// Fixed, ordered set of backends. Order is rotation order.
#[derive(Debug)]
pub struct BackendPool {
    backends: Vec<BackendInstance>,
}

impl BackendPool {
    /// Create a pool from backend addresses. Duplicates are kept as separate instances.
    pub fn new<I, S>(addresses: I, breaker: CircuitBreakerConfig) -> Result<Self, RouterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backends: Vec<BackendInstance> = addresses
            .into_iter()
            .enumerate()
            .map(|(index, address)| BackendInstance::new(index, address, breaker))
            .collect();

        if backends.is_empty() {
            return Err(RouterError::EmptyPool);
        }

        tracing::info!(
            backends = ?backends.iter().map(BackendInstance::address).collect::<Vec<_>>(),
            failure_threshold = breaker.failure_threshold,
            reset_timeout_ms = breaker.reset_timeout.as_millis() as u64,
            "Backend pool created"
        );

        Ok(Self { backends })
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BackendInstance> {
        self.backends.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendInstance> {
        self.backends.iter()
    }

    /// Status of every backend, in rotation order.
    pub fn snapshot(&self) -> Vec<BackendStatus> {
        self.backends.iter().map(BackendInstance::status).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pool_is_rejected() {
        let err = BackendPool::new(Vec::<String>::new(), CircuitBreakerConfig::default()).unwrap_err();
        assert!(matches!(err, RouterError::EmptyPool));
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let pool = BackendPool::new(
            ["http://a", "http://b", "http://a"],
            CircuitBreakerConfig::default(),
        )
        .unwrap();

        let addrs: Vec<_> = pool.iter().map(|b| b.address().to_string()).collect();
        assert_eq!(addrs, vec!["http://a", "http://b", "http://a"]);
        assert_eq!(pool.len(), 3);
        assert!(!pool.is_empty());
    }

    #[test]
    fn test_snapshot() {
        let pool = BackendPool::new(["http://a", "http://b"], CircuitBreakerConfig::default()).unwrap();
        pool.get(1).unwrap().report_failure();

        let snapshot = pool.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].consecutive_failures, 0);
        assert_eq!(snapshot[1].consecutive_failures, 1);
        assert_eq!(snapshot[1].state, "closed");
    }
}
