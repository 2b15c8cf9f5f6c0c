//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → registry.rs (round-robin over healthy backends)
//!     → pool.rs (check out a client handle for that backend)
//!     → forward, then the handle goes back to the pool (or is discarded)
//! ```
//!
//! # Design Decisions
//! - Registry is shared with the health monitor; pool is dispatcher-only
//! - Each has its own lock, never held across an await
//! - Unhealthy backends are skipped, never removed

pub mod backend;
pub mod pool;
pub mod registry;

pub use backend::Backend;
pub use pool::{ClientHandle, ConnectionPool, PoolConfig, PooledClient};
pub use registry::Registry;
