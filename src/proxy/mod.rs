//! Request/response orchestration.
//!
//! # Data Flow
//! ```text
//! ProxyRequest (from http layer)
//!     → handler.rs (admit: reserved path, scheme)
//!     → rewrite::rewrite_outbound
//!     → upstream.rs (one call, redirects not followed)
//!     → rewrite::rewrite_inbound
//!     → ProxyResponse (to http layer)
//! ```
//!
//! # Design Decisions
//! - The backend host is the only shared state; it is read lock-free and
//!   changes only through an explicit `reconfigure`
//! - One upstream attempt per request, no retries
//! - Rejections happen before any upstream call

pub mod error;
pub mod handler;
pub mod upstream;

pub use error::ProxyError;
pub use handler::{ProxyHandler, RESERVED_PREFIX};
pub use upstream::{ReqwestUpstream, UpstreamClient, UpstreamError};
