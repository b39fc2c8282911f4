//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Send one rewritten request to the backend
//! - Never follow redirects; the caller sees and follows them
//! - Decode compressed bodies so dropping `Content-Encoding` stays truthful
//!
//! # Design Decisions
//! - The caller's `Accept-Encoding` is not forwarded. reqwest then advertises
//!   only the codings it decodes (gzip, br, deflate, zstd), so a backend can
//!   never answer with a body the proxy would pass on still compressed
//! - Classify failures (timeout vs. connection vs. other)

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use axum::http::header;

use crate::config::TimeoutConfig;
use crate::http::response::strip_framing_headers;
use crate::rewrite::{ProxyRequest, ProxyResponse};

/// Failures talking to the backend.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream connection failed: {0}")]
    Connect(String),

    #[error("upstream request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else if e.is_connect() {
            UpstreamError::Connect(e.to_string())
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}

/// Sends a fully buffered request and returns the fully buffered response.
pub trait UpstreamClient: Send + Sync + 'static {
    fn send(
        &self,
        req: ProxyRequest,
    ) -> impl Future<Output = Result<ProxyResponse, UpstreamError>> + Send;
}

/// Production client backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestUpstream {
    client: reqwest::Client,
}

impl ReqwestUpstream {
    /// Build a client with redirect following disabled.
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .build()?;
        Ok(Self { client })
    }
}

impl UpstreamClient for ReqwestUpstream {
    async fn send(&self, req: ProxyRequest) -> Result<ProxyResponse, UpstreamError> {
        let mut headers = req.headers;
        strip_framing_headers(&mut headers);
        headers.remove(header::ACCEPT_ENCODING);

        let response = self
            .client
            .request(req.method, req.url)
            .headers(headers)
            .body(req.body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(ProxyResponse::new(status, headers, body))
    }
}
