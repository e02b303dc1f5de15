//! Outcome classification for completed outbound calls.

use std::time::Duration;

use axum::http::StatusCode;

use crate::dispatch::upstream::UpstreamResponse;

/// Why a backend was charged with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    ConnectionFailure,
    SlowCall,
    ErrorStatus,
    Transport,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::ConnectionFailure => "connection_failure",
            FailureReason::SlowCall => "slow_call",
            FailureReason::ErrorStatus => "error_status",
            FailureReason::Transport => "transport",
        }
    }
}

/// What a completed call means for the backend's breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure(FailureReason),
}

/// Caller-facing classification of a routed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Success,
    ServerError,
    ClientError,
    Unavailable,
}

impl RouteClass {
    pub fn from_status(status: StatusCode) -> Self {
        if is_server_error(status) {
            RouteClass::ServerError
        } else if status.is_client_error() {
            RouteClass::ClientError
        } else {
            RouteClass::Success
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::Success => "success",
            RouteClass::ServerError => "server_error",
            RouteClass::ClientError => "client_error",
            RouteClass::Unavailable => "unavailable",
        }
    }
}

/// 5xx, 408 Request Timeout and 429 Too Many Requests count against the backend.
pub fn is_server_error(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

/// A call is slow when it took strictly longer than the threshold.
pub fn is_slow(elapsed: Duration, slow_call_threshold: Duration) -> bool {
    elapsed > slow_call_threshold
}

/// Classify a completed call. Slowness is checked before the status code.
pub fn classify(response: &UpstreamResponse, slow_call_threshold: Duration) -> Verdict {
    if is_slow(response.elapsed, slow_call_threshold) {
        Verdict::Failure(FailureReason::SlowCall)
    } else if is_server_error(response.status) {
        Verdict::Failure(FailureReason::ErrorStatus)
    } else {
        Verdict::Success
    }
}
