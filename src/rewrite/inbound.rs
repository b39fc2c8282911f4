//! Backend → caller rewriting.

use super::{is_x_header, rewrite_headers, DecodedBody, HostPair, ProxyResponse};

/// Rewrite a backend response so it reads as if served by the public host.
///
/// `Content-Encoding`, `Transfer-Encoding` and `X-*` headers are dropped; they
/// describe the framing of a body that no longer exists or are internal
/// signalling. The status code is passed through verbatim.
pub fn rewrite_inbound(resp: ProxyResponse, hosts: &HostPair) -> ProxyResponse {
    let headers = rewrite_headers(
        &resp.headers,
        |name| name == "content-encoding" || name == "transfer-encoding" || is_x_header(name),
        |value| hosts.to_public(value),
    );
    let body = DecodedBody::decode(resp.body).rewrite_with(|text| hosts.to_public(text));

    ProxyResponse {
        status: resp.status,
        headers,
        body,
    }
}
