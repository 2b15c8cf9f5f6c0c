//! Backend registry with round-robin selection.
//!
//! # Responsibilities
//! - Own the ordered list of backends and the rotation cursor
//! - Select the next healthy backend in strict rotation order
//! - Accept liveness updates from the health monitor
//!
//! # Design Decisions
//! - One mutex covers backends and cursor; selection and liveness writes
//!   are both short, so a coarse lock is enough
//! - Positions never change after construction, so the cursor stays valid

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::DispatchError;
use crate::load_balancer::backend::Backend;

#[derive(Debug)]
struct RegistryState {
    backends: Vec<Backend>,
    /// Always in `[0, backends.len())` when non-empty.
    cursor: usize,
}

/// Shared registry of backends, read by the dispatcher and written by the
/// health monitor.
#[derive(Debug)]
pub struct Registry {
    state: Mutex<RegistryState>,
}

impl Registry {
    /// Build a registry from a fixed list of base addresses.
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backends = addresses.into_iter().map(Backend::new).collect();
        Self {
            state: Mutex::new(RegistryState { backends, cursor: 0 }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // Critical sections never leave the state half-updated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the next healthy backend.
    ///
    /// Scans at most `len` entries starting at the cursor, advancing the
    /// cursor on every step, so the following call starts right after the
    /// returned backend.
    pub fn next(&self) -> Result<Backend, DispatchError> {
        let mut state = self.lock();
        let len = state.backends.len();

        for _ in 0..len {
            let index = state.cursor;
            state.cursor = (state.cursor + 1) % len;

            let backend = &state.backends[index];
            if backend.is_healthy() {
                return Ok(backend.clone());
            }
        }

        Err(DispatchError::NoHealthyBackends)
    }

    /// Update a backend's liveness flag.
    ///
    /// Returns the previous value, or `None` if no backend has this address.
    pub fn set_healthy(&self, address: &str, healthy: bool) -> Option<bool> {
        let mut state = self.lock();
        let backend = state
            .backends
            .iter_mut()
            .find(|b| b.address() == address)?;
        let previous = backend.is_healthy();
        backend.set_healthy(healthy);
        Some(previous)
    }

    /// Addresses of all backends, in registry order.
    pub fn addresses(&self) -> Vec<String> {
        self.lock()
            .backends
            .iter()
            .map(|b| b.address().to_string())
            .collect()
    }

    /// Point-in-time copy of every backend.
    pub fn snapshot(&self) -> Vec<Backend> {
        self.lock().backends.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn registry(healthy: &[bool]) -> Registry {
        let registry = Registry::new((0..healthy.len()).map(|i| format!("http://server{}", i + 1)));
        for (i, h) in healthy.iter().enumerate() {
            registry.set_healthy(&format!("http://server{}", i + 1), *h);
        }
        registry
    }

    #[test]
    fn skips_unhealthy_in_rotation() {
        let registry = registry(&[true, false, true]);

        let picks: Vec<String> = (0..3)
            .map(|_| registry.next().unwrap().address().to_string())
            .collect();

        assert_eq!(picks, vec!["http://server1", "http://server3", "http://server1"]);
    }

    #[test]
    fn rotates_through_all_healthy() {
        let registry = registry(&[true, true]);

        assert_eq!(registry.next().unwrap().address(), "http://server1");
        assert_eq!(registry.next().unwrap().address(), "http://server2");
        assert_eq!(registry.next().unwrap().address(), "http://server1");
    }

    #[test]
    fn all_unhealthy_fails() {
        let registry = registry(&[false, false, false]);

        for _ in 0..5 {
            assert!(matches!(registry.next(), Err(DispatchError::NoHealthyBackends)));
        }
        assert!(registry.lock().cursor < 3);
    }

    #[test]
    fn empty_registry_fails() {
        let registry = Registry::new(Vec::<String>::new());
        assert!(registry.is_empty());
        assert!(matches!(registry.next(), Err(DispatchError::NoHealthyBackends)));
    }

    #[test]
    fn set_healthy_reports_previous_state() {
        let registry = Registry::new(["http://server1"]);

        assert_eq!(registry.set_healthy("http://server1", false), Some(true));
        assert_eq!(registry.set_healthy("http://server1", false), Some(false));
        assert_eq!(registry.set_healthy("http://unknown", true), None);
        assert!(!registry.snapshot()[0].is_healthy());
    }

    #[test]
    fn recovered_backend_rejoins_rotation() {
        let registry = registry(&[true, false]);
        assert_eq!(registry.next().unwrap().address(), "http://server1");
        assert_eq!(registry.next().unwrap().address(), "http://server1");

        registry.set_healthy("http://server2", true);
        assert_eq!(registry.next().unwrap().address(), "http://server2");
    }

    #[test]
    fn concurrent_selection_keeps_cursor_in_bounds() {
        let registry = Arc::new(registry(&[false, true, false, false]));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let registry = registry.clone();
                scope.spawn(move || {
                    for _ in 0..500 {
                        let backend = registry.next().expect("one backend is healthy");
                        assert_eq!(backend.address(), "http://server2");
                    }
                });
            }
        });

        let state = registry.lock();
        assert!(state.cursor < state.backends.len());
    }
}
