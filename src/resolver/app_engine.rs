//! Backend host from the App Engine Admin API.
//!
//! # Responsibilities
//! - Obtain an access token from the metadata server
//! - Read the service's traffic split
//! - Pick the version receiving the most traffic
//! - Build that version's `-dot-` hostname
//!
//! # Design Decisions
//! - Ties in traffic allocation go to the greatest version id, which for
//!   timestamp-style ids (`20200122t233313`) is the newest deployment
//! - API base and token URLs are configurable so the resolver can be
//!   pointed at a local stand-in

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use super::{ResolveError, VersionResolver};
use crate::config::ResolverConfig;

const API_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Service {
    #[serde(default)]
    split: Option<TrafficSplit>,
}

#[derive(Debug, Deserialize)]
struct TrafficSplit {
    #[serde(default)]
    allocations: HashMap<String, f64>,
}

/// Resolves the serving version of an App Engine service.
#[derive(Debug, Clone)]
pub struct AppEngineResolver {
    client: reqwest::Client,
    project: String,
    service: String,
    domain: String,
    api_base_url: String,
    token_url: String,
}

impl AppEngineResolver {
    pub fn from_config(config: &ResolverConfig) -> Result<Self, ResolveError> {
        let project = config
            .project
            .clone()
            .filter(|p| !p.trim().is_empty())
            .or_else(|| std::env::var("GOOGLE_CLOUD_PROJECT").ok())
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ResolveError::MissingConfig("resolver.project".into()))?;

        let client = reqwest::Client::builder().timeout(API_TIMEOUT).build()?;

        Ok(Self {
            client,
            project,
            service: config.service.clone(),
            domain: config.domain.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
        })
    }

    async fn access_token(&self) -> Result<String, ResolveError> {
        let token: AccessToken = self
            .client
            .get(&self.token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(token.access_token)
    }

    async fn serving_version(&self, token: &str) -> Result<String, ResolveError> {
        let url = format!(
            "{}/apps/{}/services/{}",
            self.api_base_url, self.project, self.service
        );
        let service: Service = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let allocations = service.split.map(|s| s.allocations).unwrap_or_default();
        pick_serving_version(&allocations)
            .map(str::to_string)
            .ok_or_else(|| ResolveError::NoServingVersion(self.service.clone()))
    }
}

impl VersionResolver for AppEngineResolver {
    async fn resolve(&self) -> Result<String, ResolveError> {
        let token = self.access_token().await?;
        let version = self.serving_version(&token).await?;
        let host = version_host(&version, &self.service, &self.project, &self.domain);

        tracing::info!(
            project = %self.project,
            service = %self.service,
            version = %version,
            host = %host,
            "Resolved serving version"
        );
        Ok(host)
    }
}

/// Version with the largest positive traffic share.
pub fn pick_serving_version(allocations: &HashMap<String, f64>) -> Option<&str> {
    allocations
        .iter()
        .filter(|(_, share)| **share > 0.0)
        .max_by(|a, b| a.1.total_cmp(b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(id, _)| id.as_str())
}

/// Hostname addressing one version directly.
pub fn version_host(version: &str, service: &str, project: &str, domain: &str) -> String {
    if service == "default" {
        format!("{}-dot-{}.{}", version, project, domain)
    } else {
        format!("{}-dot-{}-dot-{}.{}", version, service, project, domain)
    }
}
