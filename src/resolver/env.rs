//! Backend host from an environment variable.

use super::{ResolveError, VersionResolver};

/// Reads the backend host from a named environment variable.
#[derive(Debug, Clone)]
pub struct EnvResolver {
    var: String,
}

impl EnvResolver {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl VersionResolver for EnvResolver {
    async fn resolve(&self) -> Result<String, ResolveError> {
        match std::env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(ResolveError::Env(self.var.clone())),
        }
    }
}
