//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Request handling settings.
    pub proxy: ProxySettings,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// How the backend host is discovered.
    pub resolver: ResolverConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Request handling settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Paths under this prefix are answered with 404 and never forwarded.
    pub reserved_prefix: String,

    /// Take the caller's scheme from `X-Forwarded-Proto`.
    /// Enable only behind a front end that sets it (App Engine does).
    pub trust_forwarded_proto: bool,

    /// Largest inbound body that will be buffered.
    pub max_body_bytes: usize,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            reserved_prefix: "/_ah/".to_string(),
            trust_forwarded_proto: true,
            max_body_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Which resolver variant to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    /// Fixed host from `host`.
    Static,
    /// Host read from the environment variable named by `env_var`.
    Env,
    /// Host of the serving version from the App Engine Admin API.
    AppEngine,
}

/// Backend discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub kind: ResolverKind,

    /// Backend host for `static`.
    pub host: String,

    /// Variable name for `env`.
    pub env_var: String,

    /// Cloud project for `app_engine`. Falls back to `GOOGLE_CLOUD_PROJECT`.
    pub project: Option<String>,

    /// App Engine service whose serving version is targeted.
    pub service: String,

    /// Domain appended to version hostnames.
    pub domain: String,

    /// Admin API base URL.
    pub api_base_url: String,

    /// Metadata server endpoint issuing access tokens.
    pub token_url: String,

    /// Re-resolve every N seconds; 0 resolves once at startup only.
    pub refresh_secs: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            kind: ResolverKind::Env,
            host: String::new(),
            env_var: "PROXY_BACKEND_HOST".to_string(),
            project: None,
            service: "default".to_string(),
            domain: "appspot.com".to_string(),
            api_base_url: "https://appengine.googleapis.com/v1".to_string(),
            token_url: "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token"
                .to_string(),
            refresh_secs: 0,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
