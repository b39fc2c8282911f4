//! Host rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (public host)
//!     → outbound.rs (URL, headers, body: public → backend, inject X-OAuth-Redirect)
//!     → [upstream call]
//!     → inbound.rs (headers, body: backend → public)
//!     → Response to caller
//! ```
//!
//! # Design Decisions
//! - Pure transforms: no I/O, no logging, no shared state
//! - Literal, case-sensitive substring substitution with no boundary checks;
//!   an unrelated token containing a host string is rewritten as well
//! - Bodies that are not UTF-8 bypass rewriting (see `body.rs`)

pub mod body;
pub mod host;
pub mod inbound;
pub mod message;
pub mod outbound;
pub mod signal;

pub use body::DecodedBody;
pub use host::HostPair;
pub use inbound::rewrite_inbound;
pub use message::{ProxyRequest, ProxyResponse};
pub use outbound::rewrite_outbound;
pub use signal::{oauth_redirect_origin, X_OAUTH_REDIRECT};

use thiserror::Error;

/// Errors raised while building a rewritten request.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// One side of the host pair was empty.
    #[error("host rewrite requires non-empty hosts")]
    EmptyHost,

    /// The rewritten URL no longer parses.
    #[error("rewritten URL is invalid: {0}")]
    Url(#[from] url::ParseError),
}

use axum::http::{HeaderMap, HeaderValue};

/// Copy `headers`, skipping names for which `dropped` holds and passing
/// every remaining UTF-8 value through `rewrite`.
///
/// Names arrive lowercase from `HeaderMap`. Values that are not UTF-8 are
/// copied unchanged, mirroring the body policy.
fn rewrite_headers(
    headers: &HeaderMap,
    dropped: impl Fn(&str) -> bool,
    rewrite: impl Fn(&str) -> String,
) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        if dropped(name.as_str()) {
            continue;
        }
        let value = match std::str::from_utf8(value.as_bytes()) {
            Ok(text) => HeaderValue::from_str(&rewrite(text)).unwrap_or_else(|_| value.clone()),
            Err(_) => value.clone(),
        };
        out.append(name.clone(), value);
    }
    out
}

fn is_x_header(name: &str) -> bool {
    name.starts_with("x-")
}
