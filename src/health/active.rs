//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every backend's liveness path
//! - Update the registry's liveness flags from the probe results
//! - Emit a record whenever a backend goes up or down

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::future::join_all;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::load_balancer::Registry;
use crate::observability::metrics;

/// Background prober that owns the write side of backend liveness.
pub struct HealthMonitor {
    registry: Arc<Registry>,
    config: HealthCheckConfig,
    client: Client<HttpConnector, Body>,
}

impl HealthMonitor {
    pub fn new(registry: Arc<Registry>, config: HealthCheckConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            registry,
            config,
            client,
        }
    }

    /// Run the probe loop on its own task until `shutdown` fires.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            path = %self.config.path,
            "Health monitor starting"
        );

        // A zero period would panic inside `interval`.
        let period = Duration::from_secs(self.config.interval_secs.max(1));
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every backend once, concurrently, and record the outcomes.
    pub async fn check_all(&self) {
        let addresses = self.registry.addresses();
        let probes = addresses.iter().map(|address| self.probe(address));
        let results = join_all(probes).await;

        for (address, healthy) in addresses.iter().zip(results) {
            self.record(address, healthy);
        }
    }

    async fn probe(&self, address: &str) -> bool {
        let uri = format!("{}{}", address, self.config.path);

        let request = match Request::builder()
            .method("GET")
            .uri(&uri)
            .header("user-agent", "http-balancer-health-check")
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(backend = %address, error = %e, "Failed to build health check request");
                return false;
            }
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let status = response.status();
                if status != StatusCode::OK {
                    tracing::debug!(backend = %address, status = %status, "Health check failed: unexpected status");
                }
                status == StatusCode::OK
            }
            Ok(Err(e)) => {
                tracing::debug!(backend = %address, error = %e, "Health check failed: connection error");
                false
            }
            Err(_) => {
                tracing::debug!(backend = %address, "Health check failed: timeout");
                false
            }
        }
    }

    fn record(&self, address: &str, healthy: bool) {
        match self.registry.set_healthy(address, healthy) {
            Some(previous) if previous != healthy => {
                if healthy {
                    tracing::info!(backend = %address, "Backend is up");
                } else {
                    tracing::warn!(backend = %address, "Backend is down");
                }
            }
            Some(_) => {
                tracing::debug!(backend = %address, healthy, "Backend health unchanged");
            }
            None => return,
        }

        metrics::record_backend_health(address, healthy);
    }
}
