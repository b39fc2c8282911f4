//! Proxy errors and their HTTP representation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::proxy::upstream::UpstreamError;
use crate::rewrite::RewriteError;

/// Errors that end a single request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Caller used plaintext HTTP.
    #[error("Only HTTPS is supported.")]
    InsecureTransport,

    /// Path lies in the platform's reserved prefix.
    #[error("App Engine Methods not implemented")]
    ReservedPath,

    /// Request could not be turned into an absolute URL.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Inbound body exceeded the configured limit.
    #[error("Request body too large")]
    PayloadTooLarge,

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InsecureTransport => StatusCode::BAD_REQUEST,
            ProxyError::ReservedPath => StatusCode::NOT_FOUND,
            ProxyError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Rewrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Upstream(UpstreamError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let message = match &self {
            ProxyError::Upstream(_) => "Upstream request failed".to_string(),
            ProxyError::Rewrite(_) => "Internal proxy error".to_string(),
            other => other.to_string(),
        };
        (self.status(), message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ProxyError::InsecureTransport.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProxyError::ReservedPath.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ProxyError::Upstream(UpstreamError::Timeout).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ProxyError::Upstream(UpstreamError::Connect("refused".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ProxyError::Rewrite(RewriteError::EmptyHost).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn fixed_messages() {
        assert_eq!(ProxyError::InsecureTransport.to_string(), "Only HTTPS is supported.");
        assert_eq!(ProxyError::ReservedPath.to_string(), "App Engine Methods not implemented");
    }
}
