//! Request and response values passed through the rewriter.

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use url::Url;

/// A fully buffered HTTP request.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub url: Url,
    /// Header names are case-insensitive; repeated headers keep their order.
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Host exactly as the caller sent it. `Url` normalises case and
    /// default ports, so the literal value is kept alongside.
    pub caller_host: Option<String>,
}

impl ProxyRequest {
    pub fn new(method: Method, url: Url, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            url,
            headers,
            body: body.into(),
            caller_host: None,
        }
    }

    /// Record the host as the caller wrote it.
    pub fn with_caller_host(mut self, host: impl Into<String>) -> Self {
        self.caller_host = Some(host.into());
        self
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Host as addressed by the caller, including an explicit port.
    pub fn host(&self) -> String {
        if let Some(host) = self.caller_host.as_deref().filter(|h| !h.is_empty()) {
            return host.to_string();
        }
        match (self.url.host_str(), self.url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        }
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }
}
