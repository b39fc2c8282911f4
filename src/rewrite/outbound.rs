//! Caller → backend rewriting.

use axum::http::HeaderValue;
use url::{Position, Url};

use super::{is_x_header, rewrite_headers, DecodedBody, HostPair, ProxyRequest, RewriteError};
use super::signal::X_OAUTH_REDIRECT;

/// Rewrite a caller's request so it addresses the backend host.
///
/// - URL: authority set to the backend, host substitution on the rest of
///   the URL string, then `%2F` → `/`
/// - Headers: `Forwarded` and `X-*` dropped, the rest rewritten
/// - `X-OAuth-Redirect: https://{public}` added exactly once
/// - Body: rewritten when UTF-8, otherwise forwarded byte for byte
pub fn rewrite_outbound(req: ProxyRequest, hosts: &HostPair) -> Result<ProxyRequest, RewriteError> {
    // The parsed authority is normalised and may not match the caller's
    // literal host, so it is replaced outright.
    let url = format!(
        "{}://{}{}",
        req.url.scheme(),
        hosts.backend(),
        hosts.to_backend(&req.url[Position::BeforePath..])
    )
    .replace("%2F", "/");
    let url = Url::parse(&url)?;

    let mut headers = rewrite_headers(
        &req.headers,
        |name| name == "forwarded" || is_x_header(name),
        |value| hosts.to_backend(value),
    );
    let redirect = format!("https://{}", hosts.public());
    if let Ok(value) = HeaderValue::from_str(&redirect) {
        headers.insert(X_OAUTH_REDIRECT, value);
    }

    let body = DecodedBody::decode(req.body).rewrite_with(|text| hosts.to_backend(text));

    Ok(ProxyRequest {
        method: req.method,
        url,
        headers,
        body,
        caller_host: None,
    })
}
