//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML/JSON)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → pieces handed to registry, pool and health monitor at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once; backends are fixed for the life of the process
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ConnectionPoolConfig, HealthCheckConfig, ListenerConfig, ObservabilityConfig, ProxyConfig,
};
