//! Host-rewriting HTTPS reverse proxy.
//!
//! Forwards every request to a single resolved backend host, rewriting the
//! public hostname to the backend hostname on the way in and back again on
//! the way out, and signals the public origin to the backend through
//! `X-OAuth-Redirect`.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod resolver;
pub mod rewrite;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::ProxyHandler;
