//! Backend host discovery.
//!
//! # Data Flow
//! ```text
//! ResolverConfig
//!     → Resolver::from_config (pick variant)
//!     → resolve() once at startup (lifecycle::startup)
//!     → ProxyHandler::new(host)
//!
//! Optional (resolver.refresh_secs > 0):
//!     refresh.rs re-resolves on an interval
//!     → ProxyHandler::reconfigure on change
//! ```
//!
//! # Design Decisions
//! - Resolution failure at startup is fatal; the proxy never serves with
//!   an empty host
//! - Every resolved host is validated as an HTTP authority

pub mod app_engine;
pub mod env;
pub mod refresh;
pub mod static_host;

use std::future::Future;
use std::str::FromStr;

use axum::http::uri::Authority;
use thiserror::Error;

use crate::config::{ResolverConfig, ResolverKind};

pub use app_engine::AppEngineResolver;
pub use env::EnvResolver;
pub use refresh::BackendRefresher;
pub use static_host::StaticResolver;

/// Errors raised while discovering the backend host.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Required setting missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// Environment variable unset or empty.
    #[error("environment variable {0} is not set")]
    Env(String),

    /// Deployment API call failed.
    #[error("deployment API error: {0}")]
    Api(String),

    /// Service has no version receiving traffic.
    #[error("service '{0}' has no version serving traffic")]
    NoServingVersion(String),

    /// Resolved value is not usable as a host.
    #[error("invalid backend host '{0}'")]
    InvalidHost(String),
}

impl From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        ResolveError::Api(e.to_string())
    }
}

/// Source of the backend host.
pub trait VersionResolver: Send + Sync {
    fn resolve(&self) -> impl Future<Output = Result<String, ResolveError>> + Send;
}

/// Check that `host` is a bare `host[:port]` authority.
pub fn validate_host(host: &str) -> Result<(), ResolveError> {
    let invalid = || ResolveError::InvalidHost(host.to_string());
    if host.is_empty() || host.contains('@') {
        return Err(invalid());
    }
    Authority::from_str(host).map_err(|_| invalid())?;
    Ok(())
}

/// Resolver selected by configuration.
#[derive(Debug)]
pub enum Resolver {
    Static(StaticResolver),
    Env(EnvResolver),
    AppEngine(AppEngineResolver),
}

impl Resolver {
    pub fn from_config(config: &ResolverConfig) -> Result<Self, ResolveError> {
        Ok(match config.kind {
            ResolverKind::Static => Resolver::Static(StaticResolver::new(config.host.clone())),
            ResolverKind::Env => Resolver::Env(EnvResolver::new(config.env_var.clone())),
            ResolverKind::AppEngine => Resolver::AppEngine(AppEngineResolver::from_config(config)?),
        })
    }
}

impl VersionResolver for Resolver {
    async fn resolve(&self) -> Result<String, ResolveError> {
        let host = match self {
            Resolver::Static(r) => r.resolve().await?,
            Resolver::Env(r) => r.resolve().await?,
            Resolver::AppEngine(r) => r.resolve().await?,
        };
        validate_host(&host)?;
        Ok(host)
    }
}
