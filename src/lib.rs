//! HTTP load balancer library.
//!
//! Round-robin dispatch over a fixed set of backends, with an active
//! health monitor and a bounded per-backend pool of reusable clients.

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use error::{DispatchError, PoolFull};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
