//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{ProxyConfig, ResolverKind};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("proxy.reserved_prefix must start with '/'")]
    ReservedPrefix,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("resolver.host is required for the static resolver")]
    MissingStaticHost,

    #[error("resolver.env_var is required for the env resolver")]
    MissingEnvVar,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if !config.proxy.reserved_prefix.starts_with('/') {
        errors.push(ValidationError::ReservedPrefix);
    }
    if config.proxy.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("proxy.max_body_bytes"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }

    match config.resolver.kind {
        ResolverKind::Static if config.resolver.host.trim().is_empty() => {
            errors.push(ValidationError::MissingStaticHost);
        }
        ResolverKind::Env if config.resolver.env_var.trim().is_empty() => {
            errors.push(ValidationError::MissingEnvVar);
        }
        _ => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
