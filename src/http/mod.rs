//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all routes)
//!     → request.rs (request ID, public URL, buffered body → ProxyRequest)
//!     → proxy::ProxyHandler (admit, rewrite, forward)
//!     → response.rs (framing headers, ProxyResponse → Response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
