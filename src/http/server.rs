//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with a catch-all dispatch handler
//! - Wire up middleware (request id, tracing)
//! - Pick a backend, borrow a pooled client, forward, relay the response
//! - Own the health monitor task for the lifetime of the server

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, uri::PathAndQuery, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::error::DispatchError;
use crate::health::HealthMonitor;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::load_balancer::{Backend, ConnectionPool, PoolConfig, Registry};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub pool: Arc<ConnectionPool>,
}

/// HTTP front end of the load balancer.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    registry: Arc<Registry>,
    pool: Arc<ConnectionPool>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let registry = Arc::new(Registry::new(config.backends.iter().cloned()));
        let pool = Arc::new(ConnectionPool::new(PoolConfig::from(&config.pool)));

        let state = AppState {
            registry: registry.clone(),
            pool: pool.clone(),
        };

        Self {
            router: Self::build_router(state),
            config,
            registry,
            pool,
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(dispatch))
            .route("/{*path}", any(dispatch))
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for serving or in-process calls.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn pool(&self) -> Arc<ConnectionPool> {
        self.pool.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then wait for the health
    /// monitor to stop.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.registry.len(),
            "HTTP server starting"
        );

        let monitor = HealthMonitor::new(self.registry.clone(), self.config.health_check.clone())
            .spawn(shutdown.resubscribe());

        let served = axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await;

        if let Err(e) = served {
            monitor.abort();
            return Err(e);
        }

        if let Err(e) = monitor.await {
            tracing::error!(error = %e, "Health monitor task failed");
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every inbound request is forwarded as a GET of the
/// same path and query to the next healthy backend.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request).to_string();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map_or("/", PathAndQuery::as_str)
        .to_string();

    let backend = match state.registry.next() {
        Ok(backend) => backend,
        Err(e) => {
            tracing::warn!(request_id = %request_id, path = %path_and_query, "No healthy backends");
            metrics::record_request(e.status().as_u16(), "none", start);
            return e.into_response();
        }
    };

    let response = match forward(&state.pool, &backend, &path_and_query).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, backend = %backend, error = %e, "Dispatch failed");
            e.into_response()
        }
    };

    metrics::record_request(response.status().as_u16(), backend.address(), start);
    response
}

/// Forward to `backend` with a pooled client and buffer the whole response.
///
/// The client goes back to the pool when this returns, on every path.
async fn forward(
    pool: &ConnectionPool,
    backend: &Backend,
    path_and_query: &str,
) -> Result<Response, DispatchError> {
    let client = pool.checkout(backend.address());
    let url = backend.url_for(path_and_query);
    tracing::debug!(url = %url, client_id = %client.id(), "Forwarding request");

    let upstream = client
        .client()
        .get(&url)
        .send()
        .await
        .map_err(DispatchError::Forwarding)?;

    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let body = upstream.bytes().await.map_err(DispatchError::ReadBody)?;

    let mut response = (status, body).into_response();
    match content_type {
        Some(value) => {
            response.headers_mut().insert(CONTENT_TYPE, value);
        }
        None => {
            response.headers_mut().remove(CONTENT_TYPE);
        }
    }
    Ok(response)
}
