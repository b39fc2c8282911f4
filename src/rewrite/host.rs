//! The public/backend host pair and literal substitution.

use super::RewriteError;

/// Public-facing host and resolved backend host for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPair {
    public: String,
    backend: String,
}

impl HostPair {
    /// Create a host pair. Both hosts must be non-empty.
    pub fn new(public: impl Into<String>, backend: impl Into<String>) -> Result<Self, RewriteError> {
        let public = public.into();
        let backend = backend.into();
        if public.is_empty() || backend.is_empty() {
            return Err(RewriteError::EmptyHost);
        }
        Ok(Self { public, backend })
    }

    /// The host the caller addressed.
    pub fn public(&self) -> &str {
        &self.public
    }

    /// The host requests are forwarded to.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Replace every occurrence of the public host with the backend host.
    pub fn to_backend(&self, text: &str) -> String {
        text.replace(&self.public, &self.backend)
    }

    /// Replace every occurrence of the backend host with the public host.
    pub fn to_public(&self, text: &str) -> String {
        text.replace(&self.backend, &self.public)
    }
}
