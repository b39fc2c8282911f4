//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The backend host is resolved exactly once here; later changes go
//!   through the optional refresher

use std::sync::Arc;

use thiserror::Error;

use crate::config::ProxyConfig;
use crate::proxy::{ProxyHandler, ReqwestUpstream, UpstreamError};
use crate::resolver::{ResolveError, Resolver};

/// Errors that abort process startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("backend resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("failed to build upstream client: {0}")]
    Upstream(#[from] UpstreamError),
}

/// Resolve the backend host and build the production handler.
///
/// Returns the resolver too so it can be reused for periodic refresh.
pub async fn build_handler(
    config: &ProxyConfig,
) -> Result<(Arc<ProxyHandler<ReqwestUpstream>>, Resolver), StartupError> {
    let resolver = Resolver::from_config(&config.resolver)?;
    let upstream = ReqwestUpstream::new(&config.timeouts)?;

    let handler = ProxyHandler::from_resolver(&resolver, upstream)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Could not resolve backend host"))?
        .with_reserved_prefix(config.proxy.reserved_prefix.clone());

    tracing::info!(
        backend_host = %handler.backend_host(),
        kind = ?config.resolver.kind,
        "Backend host resolved"
    );

    Ok((Arc::new(handler), resolver))
}
