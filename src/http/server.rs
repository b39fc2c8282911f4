//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Convert inbound requests and hand them to the `ProxyHandler`
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{request_id::SetRequestIdLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ProxyConfig, ProxySettings};
use crate::http::request::{caller_host, public_url, read_body, request_id, MakeRequestUuidV4};
use crate::observability::metrics;
use crate::proxy::{ProxyError, ProxyHandler, UpstreamClient};
use crate::rewrite::{ProxyRequest, ProxyResponse};

/// Application state injected into handlers.
pub struct AppState<C> {
    pub handler: Arc<ProxyHandler<C>>,
    pub settings: Arc<ProxySettings>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            settings: Arc::clone(&self.settings),
        }
    }
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server forwarding through `handler`.
    pub fn new<C: UpstreamClient>(config: ProxyConfig, handler: Arc<ProxyHandler<C>>) -> Self {
        let state = AppState {
            handler,
            settings: Arc::new(config.proxy.clone()),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router<C: UpstreamClient>(config: &ProxyConfig, state: AppState<C>) -> Router {
        // Outlive the upstream timeout so a slow backend surfaces as 504.
        let deadline = Duration::from_secs(config.timeouts.request_secs + config.timeouts.connect_secs);

        Router::new()
            .route("/", any(proxy_handler::<C>))
            .route("/{*path}", any(proxy_handler::<C>))
            .with_state(state)
            .layer(TimeoutLayer::new(deadline))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            reserved_prefix = %self.config.proxy.reserved_prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Catch-all handler: every method, every path.
async fn proxy_handler<C: UpstreamClient>(
    State(state): State<AppState<C>>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request);
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Proxying request"
    );

    let response = match forward(&state, request).await {
        Ok(response) => response.into_response(),
        Err(e @ (ProxyError::Upstream(_) | ProxyError::Rewrite(_))) => {
            tracing::error!(
                request_id = %request_id,
                backend = %state.handler.backend_host(),
                error = %e,
                "Upstream error"
            );
            e.into_response()
        }
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                path = %path,
                reason = %e,
                "Request rejected"
            );
            e.into_response()
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start_time);
    response
}

/// Turn the inbound request into a `ProxyRequest` and run it through the handler.
///
/// Admission is checked before the body is buffered.
async fn forward<C: UpstreamClient>(
    state: &AppState<C>,
    request: Request<Body>,
) -> Result<ProxyResponse, ProxyError> {
    let (parts, body) = request.into_parts();

    let host = caller_host(&parts)?;
    let url = public_url(&parts, state.settings.trust_forwarded_proto)?;
    state.handler.admit(&url)?;

    let body = read_body(body, state.settings.max_body_bytes).await?;
    let req = ProxyRequest::new(parts.method, url, parts.headers, body).with_caller_host(host);
    state.handler.handle(req).await
}
