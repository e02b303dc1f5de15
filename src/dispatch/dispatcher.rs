//! Request dispatcher.
//!
//! # Responsibilities
//! - Pick a permitted backend through the round-robin selector
//! - Perform exactly one outbound call per inbound request
//! - Classify the outcome and report it to that backend's breaker
//! - Turn pool exhaustion and connection failures into the fixed unavailable outcome
//!
//! # Design Decisions
//! - No failover: a connection failure is not retried against the next backend
//! - Breaker updates happen inline, never batched
//! - Unclassified transport faults are recorded and returned, never swallowed

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::StatusCode;

use crate::dispatch::classify::{classify, FailureReason, RouteClass, Verdict};
use crate::dispatch::upstream::{Payload, Upstream, UpstreamError, UpstreamResponse};
use crate::error::RouterError;
use crate::load_balancer::{BackendInstance, BackendPool, RoundRobin};
use crate::observability::metrics;

/// Body returned to callers when no backend can take the request.
pub const UNAVAILABLE_MESSAGE: &str =
    "No healthy Application API instances available. The request was not processed. You can retry again later.";

/// Default duration above which a completed call counts as a failure.
pub const DEFAULT_SLOW_CALL_THRESHOLD: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    pub slow_call_threshold: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            slow_call_threshold: DEFAULT_SLOW_CALL_THRESHOLD,
        }
    }
}

/// Result of routing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    pub class: RouteClass,
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
    /// Address of the backend that answered, if any.
    pub backend: Option<String>,
}

impl RouteOutcome {
    /// The fixed 503 outcome.
    pub fn unavailable() -> Self {
        Self {
            class: RouteClass::Unavailable,
            status: StatusCode::SERVICE_UNAVAILABLE,
            content_type: Some("text/plain; charset=utf-8".to_string()),
            body: Bytes::from_static(UNAVAILABLE_MESSAGE.as_bytes()),
            backend: None,
        }
    }

    fn forwarded(backend: &BackendInstance, response: UpstreamResponse) -> Self {
        Self {
            class: RouteClass::from_status(response.status),
            status: response.status,
            content_type: response.content_type,
            body: response.body,
            backend: Some(backend.address().to_string()),
        }
    }
}

/// Drives inbound requests to the backend pool.
pub struct Dispatcher<U> {
    selector: RoundRobin,
    upstream: U,
    config: DispatchConfig,
}

impl<U: Upstream> Dispatcher<U> {
    pub fn new(pool: Arc<BackendPool>, upstream: U, config: DispatchConfig) -> Self {
        tracing::info!(
            slow_call_threshold_ms = config.slow_call_threshold.as_millis() as u64,
            "Dispatcher ready"
        );
        Self {
            selector: RoundRobin::new(pool),
            upstream,
            config,
        }
    }

    pub fn pool(&self) -> &BackendPool {
        self.selector.pool()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Route one request.
    ///
    /// Returns the backend's response, the fixed unavailable outcome, or the unclassified
    /// transport fault that ended the call.
    pub async fn route(&self, payload: Payload) -> Result<RouteOutcome, RouterError> {
        let Some(backend) = self.selector.select_next() else {
            tracing::warn!("No healthy Application API instances available. The request was not processed.");
            metrics::record_pool_exhausted();
            return Ok(RouteOutcome::unavailable());
        };

        match self.upstream.send(backend.address(), payload).await {
            Ok(response) => {
                self.judge(backend, &response);

                let elapsed = response.elapsed;
                let outcome = RouteOutcome::forwarded(backend, response);
                metrics::record_request(backend.address(), outcome.class, elapsed);
                Ok(outcome)
            }
            Err(UpstreamError::Connect(reason)) => {
                tracing::warn!(address = %backend.address(), error = %reason, "Downstream server down");
                self.fail(backend, FailureReason::ConnectionFailure);
                Ok(RouteOutcome::unavailable())
            }
            Err(source) => {
                tracing::error!(
                    address = %backend.address(),
                    error = %source,
                    "Error processing the request for downstream server"
                );
                self.fail(backend, FailureReason::Transport);
                Err(RouterError::Upstream {
                    address: backend.address().to_string(),
                    source,
                })
            }
        }
    }

    fn judge(&self, backend: &BackendInstance, response: &UpstreamResponse) {
        match classify(response, self.config.slow_call_threshold) {
            Verdict::Success => backend.report_success(),
            Verdict::Failure(reason) => {
                match reason {
                    FailureReason::SlowCall => tracing::warn!(
                        address = %backend.address(),
                        elapsed_ms = response.elapsed.as_millis() as u64,
                        "Downstream server took too long to answer"
                    ),
                    _ => tracing::warn!(
                        address = %backend.address(),
                        status = %response.status,
                        "Downstream server returned an HTTP error"
                    ),
                }
                self.fail(backend, reason);
            }
        }
    }

    fn fail(&self, backend: &BackendInstance, reason: FailureReason) {
        metrics::record_breaker_failure(backend.address(), reason);
        backend.report_failure();
    }
}
