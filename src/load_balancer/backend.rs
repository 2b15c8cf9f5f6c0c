//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server by its base address
//! - Carry the liveness flag written by the health monitor

use std::fmt;

/// A single backend server.
///
/// The address is the backend's identity and never changes after
/// construction. Only the health monitor flips `healthy`, always through
/// [`Registry::set_healthy`](crate::load_balancer::registry::Registry::set_healthy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    address: String,
    healthy: bool,
}

impl Backend {
    /// Create a new backend. Backends start healthy until a probe says otherwise.
    pub fn new(address: impl Into<String>) -> Self {
        let mut address = address.into();
        while address.ends_with('/') {
            address.pop();
        }
        Self {
            address,
            healthy: true,
        }
    }

    /// Base address, e.g. `http://127.0.0.1:8000`.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    pub(crate) fn set_healthy(&mut self, healthy: bool) {
        self.healthy = healthy;
    }

    /// Target URL for forwarding `path_and_query` to this backend.
    pub fn url_for(&self, path_and_query: &str) -> String {
        format!("{}{}", self.address, path_and_query)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let backend = Backend::new("http://127.0.0.1:8000/");
        assert_eq!(backend.address(), "http://127.0.0.1:8000");
        assert_eq!(backend.url_for("/a?b=1"), "http://127.0.0.1:8000/a?b=1");
    }

    #[test]
    fn starts_healthy() {
        assert!(Backend::new("http://server1").is_healthy());
    }
}
