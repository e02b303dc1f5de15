//! Admin API handlers.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::load_balancer::BackendStatus;

#[derive(Debug, Serialize)]
pub struct BackendsResponse {
    pub slow_call_threshold_ms: u64,
    pub backends: Vec<BackendStatus>,
}

/// List every backend with its breaker state. Never transitions a breaker.
pub async fn backends(State(state): State<AppState>) -> Json<BackendsResponse> {
    let dispatcher = &state.dispatcher;
    Json(BackendsResponse {
        slow_call_threshold_ms: dispatcher.config().slow_call_threshold.as_millis() as u64,
        backends: dispatcher.pool().snapshot(),
    })
}
