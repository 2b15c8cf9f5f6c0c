//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! collected so one run reports everything that is wrong.

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.backends.is_empty() {
        errors.push(ValidationError::new("backends", "at least one backend is required"));
    }

    let mut seen = HashSet::new();
    for (i, address) in config.backends.iter().enumerate() {
        let field = format!("backends[{}]", i);
        match Url::parse(address) {
            Ok(url) if url.scheme() != "http" => {
                errors.push(ValidationError::new(field, format!("'{}' must use http://", address)));
            }
            Ok(url) if url.host().is_none() => {
                errors.push(ValidationError::new(field, format!("'{}' has no host", address)));
            }
            Ok(_) => {
                if !seen.insert(address.trim_end_matches('/')) {
                    errors.push(ValidationError::new(field, format!("'{}' is listed twice", address)));
                }
            }
            Err(e) => {
                errors.push(ValidationError::new(field, format!("'{}' is not a URL: {}", address, e)));
            }
        }
    }

    if config.pool.max_connections_per_backend == 0 {
        errors.push(ValidationError::new("pool.max_connections_per_backend", "must be at least 1"));
    }
    if config.pool.request_timeout_secs == 0 {
        errors.push(ValidationError::new("pool.request_timeout_secs", "must be greater than 0"));
    }
    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::new("health_check.interval_secs", "must be greater than 0"));
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::new("health_check.timeout_secs", "must be greater than 0"));
    }
    if !config.health_check.path.starts_with('/') {
        errors.push(ValidationError::new("health_check.path", "must start with '/'"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
