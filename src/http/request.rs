//! Inbound request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4)
//! - Reconstruct the absolute URL the caller addressed
//! - Buffer the body up to the configured limit
//!
//! # Design Decisions
//! - The caller's scheme comes from `X-Forwarded-Proto` when trusted; the
//!   platform front end terminates TLS before the proxy sees the request
//! - The request ID header is inbound-only; `X-*` headers are filtered on
//!   both hops so it never reaches the backend or the caller

use axum::body::{Body, Bytes};
use axum::http::{header, request::Parts, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::Url;
use uuid::Uuid;

use crate::proxy::ProxyError;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates `x-request-id` values for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID of an inbound request, or `"unknown"`.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Scheme the caller used.
fn caller_scheme(parts: &Parts, trust_forwarded_proto: bool) -> String {
    if trust_forwarded_proto {
        let forwarded = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty());
        if let Some(scheme) = forwarded {
            return scheme;
        }
    }
    parts.uri.scheme_str().unwrap_or("http").to_string()
}

/// Host the caller addressed, verbatim: URI authority, else the `Host` header.
pub fn caller_host(parts: &Parts) -> Result<String, ProxyError> {
    match parts.uri.authority() {
        Some(authority) => Ok(authority.as_str().to_string()),
        None => parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ProxyError::MalformedRequest("missing Host header".into())),
    }
}

/// Absolute URL the caller addressed, e.g. `https://public.example.com/a?b`.
pub fn public_url(parts: &Parts, trust_forwarded_proto: bool) -> Result<Url, ProxyError> {
    let scheme = caller_scheme(parts, trust_forwarded_proto);
    let host = caller_host(parts)?;

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let url = Url::parse(&format!("{}://{}{}", scheme, host, path_and_query))
        .map_err(|e| ProxyError::MalformedRequest(e.to_string()))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ProxyError::MalformedRequest("empty host".into()));
    }
    Ok(url)
}

/// Buffer an inbound body, failing once it exceeds `limit` bytes.
pub async fn read_body(body: Body, limit: usize) -> Result<Bytes, ProxyError> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        tracing::debug!(error = %e, limit, "Failed to buffer request body");
        ProxyError::PayloadTooLarge
    })
}
