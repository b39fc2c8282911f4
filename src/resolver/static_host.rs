//! Fixed backend host.

use super::{ResolveError, VersionResolver};

/// Always resolves to the configured host.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    host: String,
}

impl StaticResolver {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

impl VersionResolver for StaticResolver {
    async fn resolve(&self) -> Result<String, ResolveError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ResolveError::MissingConfig("resolver.host".into()));
        }
        Ok(host.to_string())
    }
}
