//! Response handling and framing.
//!
//! # Design Decisions
//! - Hop-by-hop headers stripped on both hops
//! - `Content-Length` is dropped and recomputed; rewriting changes body size
//! - Bodies are fully buffered

use axum::body::Body;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};

use crate::rewrite::ProxyResponse;

/// Headers that describe a single connection or the old body's framing.
const FRAMING_HEADERS: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "upgrade",
    "content-length",
];

/// Remove connection-scoped and length headers before sending on.
pub fn strip_framing_headers(headers: &mut HeaderMap) {
    for name in FRAMING_HEADERS {
        headers.remove(name);
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut headers = self.headers;
        strip_framing_headers(&mut headers);

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = headers;
        response
    }
}
