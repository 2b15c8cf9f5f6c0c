//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML or JSON
//! config files. Every field has a default so minimal files work.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::load_balancer::PoolConfig;

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Backend base addresses, e.g. `http://127.0.0.1:8000`, in rotation order.
    #[serde(alias = "servers")]
    pub backends: Vec<String>,

    /// Outbound connection pool settings.
    pub pool: ConnectionPoolConfig,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Connection pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionPoolConfig {
    /// Maximum idle client handles retained per backend.
    pub max_connections_per_backend: usize,

    /// Timeout for a forwarded request in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        let defaults = PoolConfig::default();
        Self {
            max_connections_per_backend: defaults.max_connections_per_backend,
            request_timeout_secs: defaults.request_timeout.as_secs(),
        }
    }
}

impl From<&ConnectionPoolConfig> for PoolConfig {
    fn from(config: &ConnectionPoolConfig) -> Self {
        Self {
            max_connections_per_backend: config.max_connections_per_backend,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable active health checks.
    pub enabled: bool,

    /// Health check interval in seconds.
    pub interval_secs: u64,

    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,

    /// Liveness path probed on every backend.
    pub path: String,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 10,
            timeout_secs: 5,
            path: "/up".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            backends = ["http://127.0.0.1:8000"]
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.pool.max_connections_per_backend, 10);
        assert_eq!(config.pool.request_timeout_secs, 5);
        assert_eq!(config.health_check.interval_secs, 10);
        assert_eq!(config.health_check.path, "/up");
    }

    #[test]
    fn servers_alias_is_accepted() {
        let config: ProxyConfig =
            serde_json::from_str(r#"{"servers": ["http://a:1", "http://b:2"]}"#).unwrap();
        assert_eq!(config.backends, vec!["http://a:1", "http://b:2"]);
    }

    #[test]
    fn pool_config_conversion() {
        let pool = PoolConfig::from(&ConnectionPoolConfig {
            max_connections_per_backend: 100,
            request_timeout_secs: 10,
        });
        assert_eq!(pool.max_connections_per_backend, 100);
        assert_eq!(pool.request_timeout, Duration::from_secs(10));
    }
}
