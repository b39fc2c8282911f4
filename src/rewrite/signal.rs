//! The `X-OAuth-Redirect` signalling header.
//!
//! The proxy always sends `X-OAuth-Redirect: https://{public host}` to the
//! backend. An OAuth client running on the backend reads it to build callback
//! URLs the caller can actually reach; without it the callback would point at
//! the backend's internal host.

use axum::http::HeaderMap;

/// Name of the signalling header.
pub const X_OAUTH_REDIRECT: &str = "x-oauth-redirect";

/// Origin to use when building OAuth callback URLs on the backend.
///
/// Returns the signalled origin when present and non-empty, otherwise
/// `fallback` (the origin derived from the backend's own request context).
pub fn oauth_redirect_origin(headers: &HeaderMap, fallback: &str) -> String {
    headers
        .get(X_OAUTH_REDIRECT)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn prefers_signalled_origin() {
        let mut headers = HeaderMap::new();
        headers.insert(X_OAUTH_REDIRECT, HeaderValue::from_static("https://public.example.com"));
        assert_eq!(
            oauth_redirect_origin(&headers, "https://v1-dot-proj.appspot.com"),
            "https://public.example.com"
        );
    }

    #[test]
    fn falls_back_without_header() {
        let headers = HeaderMap::new();
        assert_eq!(
            oauth_redirect_origin(&headers, "https://v1-dot-proj.appspot.com/"),
            "https://v1-dot-proj.appspot.com"
        );

        let mut empty = HeaderMap::new();
        empty.insert(X_OAUTH_REDIRECT, HeaderValue::from_static(""));
        assert_eq!(oauth_redirect_origin(&empty, "https://own.example"), "https://own.example");
    }
}
