//! Error types shared by the dispatch path.
//!
//! Every per-request failure is converted into an HTTP response at the
//! dispatcher boundary; none of them escape to the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::load_balancer::pool::ClientHandle;

/// Failures that end a single dispatched request.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Every backend is marked unhealthy, or the registry is empty.
    #[error("no healthy backends available")]
    NoHealthyBackends,

    /// Transport-level failure (including timeout) talking to the backend.
    #[error("error forwarding request: {0}")]
    Forwarding(#[source] reqwest::Error),

    /// The backend answered but its body could not be read.
    #[error("error reading response: {0}")]
    ReadBody(#[source] reqwest::Error),
}

impl DispatchError {
    /// Status code returned to the inbound caller.
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NoHealthyBackends => StatusCode::SERVICE_UNAVAILABLE,
            DispatchError::Forwarding(_) => StatusCode::BAD_GATEWAY,
            DispatchError::ReadBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let body = match self {
            DispatchError::NoHealthyBackends => "Service unavailable",
            DispatchError::Forwarding(_) => "Error forwarding request",
            DispatchError::ReadBody(_) => "Error reading response",
        };
        (self.status(), body).into_response()
    }
}

/// Returned by [`ConnectionPool::release`](crate::load_balancer::pool::ConnectionPool::release)
/// when the backend already holds the maximum number of idle handles.
///
/// The rejected handle is handed back so the caller decides how to dispose of it.
#[derive(Debug, thiserror::Error)]
#[error("connection pool limit exceeded for backend '{address}'")]
pub struct PoolFull {
    pub address: String,
    pub handle: ClientHandle,
}
