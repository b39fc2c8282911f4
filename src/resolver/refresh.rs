//! Periodic backend re-resolution.
//!
//! Off unless `resolver.refresh_secs > 0`. A failed re-resolution keeps the
//! current host; the proxy never drops to an unresolved state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant};

use super::VersionResolver;
use crate::proxy::{ProxyHandler, UpstreamClient};

pub struct BackendRefresher<R, C> {
    resolver: R,
    handler: Arc<ProxyHandler<C>>,
    interval: Duration,
}

impl<R: VersionResolver, C: UpstreamClient> BackendRefresher<R, C> {
    pub fn new(resolver: R, handler: Arc<ProxyHandler<C>>, interval: Duration) -> Self {
        Self {
            resolver,
            handler,
            interval,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if self.interval.is_zero() {
            tracing::info!("Backend refresh disabled");
            return;
        }

        tracing::info!(interval = ?self.interval, "Backend refresher starting");

        // Startup already resolved; skip the immediate first tick.
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Backend refresher received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Re-resolve once. Returns `true` if the backend host changed.
    pub async fn refresh_once(&self) -> bool {
        let host = match self.resolver.resolve().await {
            Ok(host) => host,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    current = %self.handler.backend_host(),
                    "Backend re-resolution failed, keeping current host"
                );
                return false;
            }
        };

        match self.handler.reconfigure(host) {
            Ok(changed) => changed,
            Err(e) => {
                tracing::warn!(error = %e, "Re-resolved host rejected, keeping current host");
                false
            }
        }
    }
}
