//! Cache invalidation fan-out
//!
//! Sweeps a fixed, ordered registry of [`CacheIntegration`]s and clears every
//! one that is present. Absence is the common case and failures are isolated
//! per integration, so the sweep always runs to the end.

pub mod integration;
pub mod integrations;

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{
    CONNECT_RESPONSE_TRANSIENT, PURGE_TIMEOUT_SECS, PluginConfig, RELEASE_TRANSIENT,
};
use crate::error::IntegrationError;
use crate::store::TransientStore;

pub use integration::CacheIntegration;
use integrations::{CloudflareEdge, NginxProxy, ObjectCache, PAGE_CACHE_PLUGINS, PageCachePlugin};

/// Outcome of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub cleared: Vec<String>,
    /// Integrations that were not installed
    pub skipped: Vec<String>,
    /// Integrations whose clear failed, with the error message
    pub failed: Vec<(String, String)>,
}

pub struct CacheInvalidator {
    store: Arc<dyn TransientStore>,
    integrations: Vec<Box<dyn CacheIntegration>>,
}

impl CacheInvalidator {
    /// Creates an invalidator with an empty registry
    pub fn new(store: Arc<dyn TransientStore>) -> Self {
        Self {
            store,
            integrations: Vec::new(),
        }
    }

    /// Creates an invalidator with the built-in registry: object cache,
    /// page-cache plugins, CDN edge cache, reverse-proxy cache
    pub fn with_defaults(
        store: Arc<dyn TransientStore>,
        config: &PluginConfig,
    ) -> Result<Self, IntegrationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PURGE_TIMEOUT_SECS))
            .build()?;

        let mut invalidator = Self::new(store.clone());
        invalidator.register(Box::new(ObjectCache::new(store)));
        invalidator.register_page_caches(&config.content_dir);
        invalidator.register(Box::new(CloudflareEdge::new(
            client.clone(),
            config.cdn.clone(),
        )));
        invalidator.register(Box::new(NginxProxy::new(
            client,
            config.reverse_proxy.clone(),
        )));

        Ok(invalidator)
    }

    fn register_page_caches(&mut self, content_dir: &Path) {
        for kind in PAGE_CACHE_PLUGINS {
            self.register(Box::new(PageCachePlugin::new(*kind, content_dir)));
        }
    }

    /// Appends an integration after those already registered
    pub fn register(&mut self, integration: Box<dyn CacheIntegration>) {
        debug!("Registered cache integration {}", integration.name());
        self.integrations.push(integration);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.integrations.iter().map(|i| i.name()).collect()
    }

    /// Reports which integrations are present, keyed by name
    pub fn detect(&self) -> BTreeMap<String, bool> {
        self.integrations
            .iter()
            .map(|i| (i.name().to_string(), i.is_present()))
            .collect()
    }

    /// Drops this plugin's own cached API responses
    pub fn clear_own_artifacts(&self) {
        for name in [RELEASE_TRANSIENT, CONNECT_RESPONSE_TRANSIENT] {
            let _ = self
                .store
                .delete_transient(name)
                .inspect_err(|e| warn!("Failed to delete transient {}: {}", name, e));
        }
    }

    /// Clears this plugin's cached artifacts, then every present integration.
    /// Never fails; per-integration errors and panics are logged and reported.
    pub async fn clear_all(&self) -> SweepReport {
        self.clear_own_artifacts();

        let mut report = SweepReport::default();
        for integration in &self.integrations {
            let name = integration.name();

            if !integration.is_present() {
                report.skipped.push(name.to_string());
                continue;
            }

            let clear = async { integration.clear().await };
            match AssertUnwindSafe(clear).catch_unwind().await {
                Ok(Ok(())) => {
                    debug!("Cleared {}", name);
                    report.cleared.push(name.to_string());
                }
                Ok(Err(e)) => {
                    warn!("Failed to clear {}: {}", name, e);
                    report.failed.push((name.to_string(), e.to_string()));
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    warn!("Failed to clear {}: {}", name, message);
                    report.failed.push((name.to_string(), message));
                }
            }
        }

        info!(
            "Cache sweep finished: {} cleared, {} skipped, {} failed",
            report.cleared.len(),
            report.skipped.len(),
            report.failed.len()
        );
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
