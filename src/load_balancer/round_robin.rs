//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::{backend::BackendInstance, pool::BackendPool};

/// Round-robin selector.
/// Stores a shared cursor to rotate through the pool, skipping open circuits.
#[derive(Debug)]
pub struct RoundRobin {
    pool: Arc<BackendPool>,
    /// Index of the next backend to check. Always `< pool.len()`.
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new(pool: Arc<BackendPool>) -> Self {
        Self {
            pool,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn pool(&self) -> &BackendPool {
        &self.pool
    }

    /// Return the next backend in rotation whose breaker grants permission.
    ///
    /// Checks at most `pool.len()` backends. Returns `None` when every one of them is open.
    pub fn select_next(&self) -> Option<&BackendInstance> {
        let len = self.pool.len();

        for _ in 0..len {
            let index = self.advance(len);
            let backend = self.pool.get(index)?;
            if backend.acquire_permission() {
                return Some(backend);
            }
            tracing::warn!(
                address = %backend.address(),
                "Downstream server is skipped because it has its circuit open"
            );
        }
        None
    }

    /// Atomically take the current cursor value and move it one step, wrapping at `len`.
    fn advance(&self, len: usize) -> usize {
        match self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
        {
            Ok(index) | Err(index) => index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::CircuitBreakerConfig;
    use std::collections::HashMap;

    fn selector(addrs: &[&str]) -> RoundRobin {
        let pool = BackendPool::new(addrs.iter().copied(), CircuitBreakerConfig::default()).unwrap();
        RoundRobin::new(Arc::new(pool))
    }

    fn open(rr: &RoundRobin, index: usize) {
        let backend = rr.pool().get(index).unwrap();
        for _ in 0..backend.breaker().config().failure_threshold {
            backend.report_failure();
        }
    }

    #[test]
    fn test_round_robin() {
        let rr = selector(&["http://a", "http://b", "http://c"]);

        let picked: Vec<_> = (0..4)
            .map(|_| rr.select_next().unwrap().address().to_string())
            .collect();
        assert_eq!(picked, vec!["http://a", "http://b", "http://c", "http://a"]);
    }

    #[test]
    fn test_skips_open_circuit() {
        let rr = selector(&["http://a", "http://b", "http://c"]);
        open(&rr, 1);

        let picked: Vec<_> = (0..6)
            .map(|_| rr.select_next().unwrap().address().to_string())
            .collect();
        assert_eq!(
            picked,
            vec!["http://a", "http://c", "http://a", "http://c", "http://a", "http://c"]
        );
    }

    #[test]
    fn test_exhaustion() {
        let rr = selector(&["http://a", "http://b"]);
        open(&rr, 0);
        open(&rr, 1);

        assert!(rr.select_next().is_none());
        assert!(rr.select_next().is_none());
    }

    #[test]
    fn test_cursor_continues_after_recovery() {
        let rr = selector(&["http://a", "http://b", "http://c"]);
        assert_eq!(rr.select_next().unwrap().address(), "http://a");

        open(&rr, 1);
        assert_eq!(rr.select_next().unwrap().address(), "http://c");

        rr.pool().get(1).unwrap().report_success();
        assert_eq!(rr.select_next().unwrap().address(), "http://a");
        assert_eq!(rr.select_next().unwrap().address(), "http://b");
    }

    #[test]
    fn test_single_backend() {
        let rr = selector(&["http://only"]);
        for _ in 0..3 {
            assert_eq!(rr.select_next().unwrap().address(), "http://only");
        }
    }

    #[test]
    fn test_concurrent_selection_is_fair() {
        let rr = Arc::new(selector(&["http://a", "http://b", "http://c", "http://d"]));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let rr = rr.clone();
                std::thread::spawn(move || {
                    let mut seen = Vec::new();
                    for _ in 0..100 {
                        seen.push(rr.select_next().unwrap().address().to_string());
                    }
                    seen
                })
            })
            .collect();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for h in handles {
            for addr in h.join().unwrap() {
                *counts.entry(addr).or_default() += 1;
            }
        }

        assert_eq!(counts.len(), 4);
        assert!(counts.values().all(|&c| c == 100), "uneven rotation: {counts:?}");
    }
}
