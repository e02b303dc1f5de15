//! Response construction.
//!
//! # Responsibilities
//! - Turn a routing outcome into the HTTP response sent to the caller
//! - Map unclassified upstream faults to gateway status codes
//!
//! # Design Decisions
//! - Backend status, content type and body pass through untouched
//! - Upstream timeouts result in 504 Gateway Timeout, other faults in 502 Bad Gateway

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::dispatch::RouteOutcome;
use crate::error::RouterError;

pub fn outcome_response(outcome: RouteOutcome) -> Response {
    let mut response = (outcome.status, outcome.body).into_response();

    let headers = response.headers_mut();
    match outcome
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
    {
        Some(value) => {
            headers.insert(header::CONTENT_TYPE, value);
        }
        None => {
            headers.remove(header::CONTENT_TYPE);
        }
    }
    response
}

pub fn error_response(err: &RouterError) -> Response {
    if err.is_timeout() {
        (StatusCode::GATEWAY_TIMEOUT, "Upstream request timed out").into_response()
    } else {
        (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
    }
}
