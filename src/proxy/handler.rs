//! The proxy handler: one request/response cycle against the backend host.

use std::sync::Arc;

use arc_swap::ArcSwap;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::observability::metrics;
use crate::proxy::error::ProxyError;
use crate::proxy::upstream::UpstreamClient;
use crate::resolver::{validate_host, ResolveError, VersionResolver};
use crate::rewrite::{rewrite_inbound, rewrite_outbound, HostPair, ProxyRequest, ProxyResponse};

/// Path prefix owned by the hosting platform; never forwarded.
pub const RESERVED_PREFIX: &str = "/_ah/";

/// Forwards requests to a single resolved backend host.
///
/// The backend host is fixed at construction. It only changes through
/// [`ProxyHandler::reconfigure`]; nothing refreshes it implicitly.
pub struct ProxyHandler<C> {
    backend_host: ArcSwap<String>,
    reserved_prefix: String,
    upstream: C,
}

impl<C: UpstreamClient> ProxyHandler<C> {
    /// Create a handler for an already resolved backend host.
    pub fn new(backend_host: impl Into<String>, upstream: C) -> Result<Self, ResolveError> {
        let backend_host = backend_host.into();
        validate_host(&backend_host)?;
        Ok(Self {
            backend_host: ArcSwap::from_pointee(backend_host),
            reserved_prefix: RESERVED_PREFIX.to_string(),
            upstream,
        })
    }

    /// Resolve the backend host once and create a handler for it.
    pub async fn from_resolver<R: VersionResolver>(resolver: &R, upstream: C) -> Result<Self, ResolveError> {
        let host = resolver.resolve().await?;
        Self::new(host, upstream)
    }

    /// Override the reserved path prefix.
    pub fn with_reserved_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reserved_prefix = prefix.into();
        self
    }

    /// Current backend host.
    pub fn backend_host(&self) -> Arc<String> {
        self.backend_host.load_full()
    }

    /// Point the handler at a different backend host.
    ///
    /// Returns `true` if the host changed. In-flight requests keep the host
    /// they started with.
    pub fn reconfigure(&self, host: impl Into<String>) -> Result<bool, ResolveError> {
        let host = host.into();
        validate_host(&host)?;

        let previous = self.backend_host.swap(Arc::new(host.clone()));
        if *previous == host {
            return Ok(false);
        }
        tracing::info!(previous = %previous, current = %host, "Backend host reconfigured");
        metrics::record_backend_change();
        Ok(true)
    }

    /// Whether `path` falls under the reserved prefix once percent-decoded.
    fn is_reserved(&self, path: &str) -> bool {
        percent_decode_str(path)
            .decode_utf8_lossy()
            .starts_with(&self.reserved_prefix)
    }

    /// Reject requests that must never reach the backend.
    ///
    /// Reserved paths are checked first so platform calls get a 404 whatever
    /// their scheme.
    pub fn admit(&self, url: &Url) -> Result<(), ProxyError> {
        if self.is_reserved(url.path()) {
            return Err(ProxyError::ReservedPath);
        }
        if url.scheme() != "https" {
            return Err(ProxyError::InsecureTransport);
        }
        Ok(())
    }

    /// Forward one request and return the rewritten backend response.
    pub async fn handle(&self, req: ProxyRequest) -> Result<ProxyResponse, ProxyError> {
        self.admit(&req.url)?;

        let backend = self.backend_host();
        let hosts = HostPair::new(req.host(), backend.as_str())?;
        let outbound = rewrite_outbound(req, &hosts)?;
        // Unescaping `%2F` can normalise dot segments into the reserved prefix.
        if self.is_reserved(outbound.url.path()) {
            return Err(ProxyError::ReservedPath);
        }

        tracing::debug!(
            method = %outbound.method,
            url = %outbound.url,
            "Forwarding to backend"
        );

        let response = self.upstream.send(outbound).await?;
        Ok(rewrite_inbound(response, &hosts))
    }
}
