//! The host's update-metadata record
//!
//! The host keeps one process-wide record of which plugins have an update
//! (`response`) and which are current (`no_update`). For any plugin key the
//! entry lives in exactly one of the two maps.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{PLUGIN_SLUG, REQUIRES_PHP_VERSION, TESTED_HOST_VERSION};
use crate::update::checker::UpdateDecision;

/// Per-plugin entry consumed by the host's native update UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntry {
    pub slug: String,
    pub plugin: String,
    pub new_version: String,
    /// Details page URL
    pub url: String,
    /// Archive URL the host downloads on upgrade
    pub package: String,
    pub tested: String,
    pub requires_php: String,
}

impl UpdateEntry {
    pub fn from_decision(plugin_id: &str, decision: &UpdateDecision) -> Self {
        let target = decision.target();
        Self {
            slug: PLUGIN_SLUG.to_string(),
            plugin: plugin_id.to_string(),
            new_version: target.version.clone(),
            url: target.url.clone(),
            package: target.download_url.clone(),
            tested: TESTED_HOST_VERSION.to_string(),
            requires_php: REQUIRES_PHP_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateMetadataRecord {
    pub last_checked: Option<DateTime<Utc>>,
    /// Installed versions keyed by plugin identifier, populated by the host
    pub checked: BTreeMap<String, String>,
    /// Plugins with a pending update
    pub response: BTreeMap<String, UpdateEntry>,
    /// Plugins that are current
    pub no_update: BTreeMap<String, UpdateEntry>,
}

impl UpdateMetadataRecord {
    /// Writes `decision` for `plugin_id` into exactly one map, removing any
    /// entry for the same key from the other.
    pub fn apply(&mut self, plugin_id: &str, decision: &UpdateDecision) {
        let entry = UpdateEntry::from_decision(plugin_id, decision);
        match decision {
            UpdateDecision::UpdateAvailable(_) => {
                self.no_update.remove(plugin_id);
                self.response.insert(plugin_id.to_string(), entry);
            }
            UpdateDecision::UpToDate(_) => {
                self.response.remove(plugin_id);
                self.no_update.insert(plugin_id.to_string(), entry);
            }
        }
    }

    pub fn has_update(&self, plugin_id: &str) -> bool {
        self.response.contains_key(plugin_id)
    }
}
