//! Troubleshooting dump for the settings page

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::StoreError;
use crate::plugin::Plugin;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub plugin_version: String,
    pub os: &'static str,
    pub arch: &'static str,
    pub site_url: String,
    /// Settings with the organization id masked
    pub settings: Option<MaskedSettings>,
    /// Presence of each known cache integration
    pub caching: BTreeMap<String, bool>,
    pub cached_release: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskedSettings {
    pub organization_id: String,
    pub domain: String,
    pub connected_at: DateTime<Utc>,
}

impl Diagnostics {
    pub fn collect(plugin: &Plugin) -> Result<Self, StoreError> {
        let settings = plugin.settings()?.map(|s| MaskedSettings {
            organization_id: s.masked_organization_id(),
            domain: s.domain,
            connected_at: s.connected_at,
        });

        let cached_release = plugin
            .release_cache
            .get()?
            .map(|cached| cached.release.tag);

        Ok(Self {
            plugin_version: plugin.version().to_string(),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            site_url: plugin.config.site_url.clone(),
            settings,
            caching: plugin.invalidator.detect(),
            cached_release,
            date: Utc::now(),
        })
    }
}
