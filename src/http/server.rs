//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the backend pool, outbound client and dispatcher from configuration
//! - Create the Axum Router with the routing and admin handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit)
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, Request},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::RouterConfig;
use crate::dispatch::{Dispatcher, HyperUpstream, Payload};
use crate::error::RouterError;
use crate::http::request::{request_id_of, x_request_id, MakeRequestUuid};
use crate::http::response::{error_response, outcome_response};
use crate::load_balancer::{state_publisher::DEFAULT_PUBLISH_INTERVAL, BackendPool, StatePublisher};

/// Path that inbound requests are routed from.
pub const ROUTER_PATH: &str = "/api/router";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher<HyperUpstream>>,
}

/// HTTP server for the router.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    pool: Arc<BackendPool>,
    dispatcher: Arc<Dispatcher<HyperUpstream>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails when the configuration has no backend addresses.
    pub fn new(config: RouterConfig) -> Result<Self, RouterError> {
        let pool = Arc::new(BackendPool::new(
            config.pool.addresses.iter().cloned(),
            config.circuit_breaker.to_breaker_config(),
        )?);
        let upstream = HyperUpstream::new(&config.timeouts, config.dispatch.max_response_bytes);
        let dispatcher = Arc::new(Dispatcher::new(
            pool.clone(),
            upstream,
            config.dispatch.to_dispatch_config(),
        ));

        let state = AppState {
            dispatcher: dispatcher.clone(),
        };
        let router = Self::build_router(&config, state);

        Ok(Self {
            router,
            config,
            pool,
            dispatcher,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        let mut router = Router::new().route(ROUTER_PATH, post(route_handler));
        if config.admin.enabled {
            router = router.route("/admin/backends", get(admin::handlers::backends));
        }

        // The inbound deadline sits just past the outbound one so upstream timeouts surface as 504.
        let inbound_timeout = Duration::from_secs(config.timeouts.request_secs + 1);

        router.with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id_of(request.headers()),
                    )
                }))
                .layer(PropagateRequestIdLayer::new(x_request_id()))
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
                .layer(TimeoutLayer::new(inbound_timeout)),
        )
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.dispatcher.pool().len(),
            "HTTP server starting"
        );

        let publisher = StatePublisher::new(self.pool.clone(), DEFAULT_PUBLISH_INTERVAL);
        tokio::spawn(publisher.run(shutdown.resubscribe()));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Shared dispatcher, for inspecting breaker state.
    pub fn dispatcher(&self) -> Arc<Dispatcher<HyperUpstream>> {
        self.dispatcher.clone()
    }
}

/// Route one inbound request through the dispatcher.
async fn route_handler(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let request_id = request_id_of(&headers);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    tracing::debug!(request_id = %request_id, bytes = body.len(), "Routing request");

    match state.dispatcher.route(Payload::new(content_type, body)).await {
        Ok(outcome) => {
            tracing::debug!(
                request_id = %request_id,
                status = %outcome.status,
                class = outcome.class.as_str(),
                backend = outcome.backend.as_deref().unwrap_or("none"),
                "Request routed"
            );
            outcome_response(outcome)
        }
        Err(err) => {
            tracing::error!(request_id = %request_id, error = %err, "Upstream error");
            error_response(&err)
        }
    }
}
