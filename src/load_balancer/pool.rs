//! Per-backend connection pool.
//!
//! # Responsibilities
//! - Cache idle outbound client handles keyed by backend address
//! - Hand out the most recently returned handle first (LIFO)
//! - Bound the number of idle handles retained per backend
//!
//! # Design Decisions
//! - A single mutex covers the whole map; acquire/release are one pop/push
//! - `acquire` never fails: an empty stack means a fresh handle
//! - `release` refuses to grow past the cap and gives the handle back

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::PoolFull;
use crate::observability::metrics;

/// Source of process-unique handle ids.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a client handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl ClientId {
    fn next() -> Self {
        Self(CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Pool settings, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// Maximum idle handles kept per backend (>= 1).
    pub max_connections_per_backend: usize,
    /// Deadline applied to every forwarded request.
    pub request_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections_per_backend: 10,
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// An outbound HTTP client owned by exactly one holder at a time.
///
/// Each handle keeps at most one idle keep-alive connection, so reusing a
/// handle reuses its warm connection.
#[derive(Debug)]
pub struct ClientHandle {
    id: ClientId,
    client: reqwest::Client,
}

impl ClientHandle {
    fn new(timeout: Duration) -> Self {
        let id = ClientId::next();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(1)
            .no_proxy()
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(client_id = %id, error = %e, "Falling back to default client settings");
                reqwest::Client::new()
            });
        tracing::trace!(client_id = %id, "Client handle created");
        Self { id, client }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

/// Idle client handles per backend address.
#[derive(Debug)]
pub struct ConnectionPool {
    config: PoolConfig,
    idle: Mutex<HashMap<String, Vec<ClientHandle>>>,
}

impl ConnectionPool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            idle: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<ClientHandle>>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the most recently released handle for `address`, or build a new one.
    pub fn acquire(&self, address: &str) -> ClientHandle {
        let reused = self.lock().get_mut(address).and_then(Vec::pop);
        match reused {
            Some(handle) => {
                tracing::trace!(backend = %address, client_id = %handle.id, "Reusing pooled client");
                handle
            }
            None => ClientHandle::new(self.config.request_timeout),
        }
    }

    /// Return a handle to the pool.
    ///
    /// Fails with [`PoolFull`] when `address` already holds
    /// `max_connections_per_backend` idle handles; the handle is returned
    /// inside the error.
    pub fn release(&self, address: &str, handle: ClientHandle) -> Result<(), PoolFull> {
        let mut idle = self.lock();
        let stack = idle.entry(address.to_string()).or_default();
        if stack.len() >= self.config.max_connections_per_backend {
            return Err(PoolFull {
                address: address.to_string(),
                handle,
            });
        }
        stack.push(handle);
        Ok(())
    }

    /// Number of idle handles currently held for `address`.
    pub fn idle_count(&self, address: &str) -> usize {
        self.lock().get(address).map_or(0, Vec::len)
    }

    /// Check out a handle that goes back to the pool when dropped.
    pub fn checkout(&self, address: &str) -> PooledClient<'_> {
        PooledClient {
            pool: self,
            address: address.to_string(),
            handle: Some(self.acquire(address)),
        }
    }
}

/// RAII guard around a checked-out [`ClientHandle`].
///
/// On drop the handle is released; if the pool is full it is discarded.
#[derive(Debug)]
pub struct PooledClient<'a> {
    pool: &'a ConnectionPool,
    address: String,
    handle: Option<ClientHandle>,
}

impl std::ops::Deref for PooledClient<'_> {
    type Target = ClientHandle;

    fn deref(&self) -> &Self::Target {
        // Only taken in `drop`.
        self.handle.as_ref().unwrap_or_else(|| unreachable!("handle taken before drop"))
    }
}

impl Drop for PooledClient<'_> {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        if let Err(full) = self.pool.release(&self.address, handle) {
            tracing::debug!(backend = %full.address, client_id = %full.handle.id, "Pool full, discarding client");
            metrics::record_pool_discard(&full.address);
        }
    }
}
