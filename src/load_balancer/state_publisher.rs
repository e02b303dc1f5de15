//! Periodic export of circuit states.
//!
//! A circuit only closes on a permission check, so an idle backend would keep
//! reporting open after its cooldown. This task republishes the read-only
//! state of every backend on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::load_balancer::pool::BackendPool;

/// Default interval between gauge refreshes.
pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_secs(1);

pub struct StatePublisher {
    pool: Arc<BackendPool>,
    interval: Duration,
}

impl StatePublisher {
    pub fn new(pool: Arc<BackendPool>, interval: Duration) -> Self {
        Self { pool, interval }
    }

    /// Refresh every backend's gauge once.
    pub fn publish(&self) {
        for backend in self.pool.iter() {
            backend.refresh_gauge();
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::debug!(interval_ms = self.interval.as_millis() as u64, "Circuit state publisher starting");
        let mut ticker = time::interval(self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.publish(),
                _ = shutdown.recv() => {
                    tracing::debug!("Circuit state publisher stopping");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::CircuitBreakerConfig;

    fn pool() -> Arc<BackendPool> {
        Arc::new(BackendPool::new(["http://a", "http://b"], CircuitBreakerConfig::default()).unwrap())
    }

    #[test]
    fn test_publish_does_not_transition() {
        let pool = pool();
        for _ in 0..3 {
            pool.get(0).unwrap().report_failure();
        }

        StatePublisher::new(pool.clone(), DEFAULT_PUBLISH_INTERVAL).publish();
        assert_eq!(pool.get(0).unwrap().breaker().consecutive_failures(), 3);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (tx, rx) = broadcast::channel(1);
        let task = tokio::spawn(StatePublisher::new(pool(), Duration::from_millis(10)).run(rx));

        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("publisher did not stop")
            .unwrap();
    }
}
