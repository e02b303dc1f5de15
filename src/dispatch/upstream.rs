//! Outbound call boundary.
//!
//! # Responsibilities
//! - Define the shape of an outbound call result (response, connection failure, other fault)
//! - Provide the hyper-based client used in production
//!
//! # Design Decisions
//! - Elapsed time is measured by the client and handed to the dispatcher with the response
//! - Connection failures are distinguished from every other transport fault
//! - The request timeout is the only thing that bounds a call; slow calls are not cancelled

use std::error::Error as StdError;
use std::future::Future;
use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::{response::Parts, StatusCode};
use hyper::header::CONTENT_TYPE;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::TimeoutConfig;

/// Opaque inbound payload forwarded to a backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl Payload {
    pub fn new(content_type: Option<String>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type,
            body: body.into(),
        }
    }

    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::new(Some("application/json".to_string()), body)
    }
}

/// A completed outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
    /// Wall-clock duration of the call, body included.
    pub elapsed: Duration,
}

/// An outbound call that did not produce a response.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The backend could not be reached at all.
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Any other transport fault.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Sends a payload to a backend address.
pub trait Upstream: Send + Sync + 'static {
    fn send(
        &self,
        address: &str,
        payload: Payload,
    ) -> impl Future<Output = Result<UpstreamResponse, UpstreamError>> + Send;
}

/// Default upper bound on a buffered backend response.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;

/// Upstream backed by the hyper-util pooled client. Backends receive `POST <address>`.
#[derive(Clone)]
pub struct HyperUpstream {
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
    max_response_bytes: usize,
}

impl HyperUpstream {
    pub fn new(timeouts: &TimeoutConfig, max_response_bytes: usize) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            request_timeout: Duration::from_secs(timeouts.request_secs),
            max_response_bytes,
        }
    }

    async fn call(&self, request: hyper::Request<Body>) -> Result<(Parts, Bytes), UpstreamError> {
        let response = self.client.request(request).await.map_err(|e| {
            if e.is_connect() {
                UpstreamError::Connect(describe(&e))
            } else {
                UpstreamError::Transport(describe(&e))
            }
        })?;

        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), self.max_response_bytes)
            .await
            .map_err(|e| UpstreamError::Transport(describe(&e)))?;

        Ok((parts, body))
    }
}

impl Upstream for HyperUpstream {
    async fn send(&self, address: &str, payload: Payload) -> Result<UpstreamResponse, UpstreamError> {
        let uri: hyper::Uri = address
            .parse()
            .map_err(|e| UpstreamError::Transport(format!("invalid address {address}: {e}")))?;

        let mut builder = hyper::Request::builder().method(hyper::Method::POST).uri(uri);
        if let Some(content_type) = &payload.content_type {
            builder = builder.header(CONTENT_TYPE, content_type.as_str());
        }
        let request = builder
            .body(Body::from(payload.body))
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let start = Instant::now();
        let (parts, body) = tokio::time::timeout(self.request_timeout, self.call(request))
            .await
            .map_err(|_| UpstreamError::Timeout(self.request_timeout))??;
        let elapsed = start.elapsed();

        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Ok(UpstreamResponse {
            status: parts.status,
            content_type,
            body,
            elapsed,
        })
    }
}

/// Flatten an error and its sources into one line.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
