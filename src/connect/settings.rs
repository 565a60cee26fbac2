use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SETTINGS_OPTION;
use crate::error::StoreError;
use crate::store::OptionStore;

/// The site's connection to the analytics service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSettings {
    pub organization_id: String,
    pub domain: String,
    pub connected_at: DateTime<Utc>,
}

impl PluginSettings {
    pub fn new(organization_id: &str, domain: &str) -> Self {
        Self {
            organization_id: organization_id.to_string(),
            domain: domain.to_string(),
            connected_at: Utc::now(),
        }
    }

    /// Organization id with everything but the first and last four characters hidden
    pub fn masked_organization_id(&self) -> String {
        let chars: Vec<char> = self.organization_id.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }

    /// Reads the persisted record. An undecodable record counts as absent.
    pub fn load(store: &dyn OptionStore) -> Result<Option<Self>, StoreError> {
        let Some(raw) = store.get_option(SETTINGS_OPTION)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => Ok(Some(settings)),
            Err(e) => {
                warn!("Ignoring undecodable settings record: {}", e);
                Ok(None)
            }
        }
    }

    /// Replaces the persisted record
    pub fn save(&self, store: &dyn OptionStore) -> Result<(), StoreError> {
        store.set_option(SETTINGS_OPTION, &serde_json::to_string(self)?)?;
        info!(
            "Saved settings for organization {}",
            self.masked_organization_id()
        );
        Ok(())
    }

    /// Deletes the persisted record; deleting an absent record is not an error
    pub fn delete(store: &dyn OptionStore) -> Result<bool, StoreError> {
        let removed = store.delete_option(SETTINGS_OPTION)?;
        if removed {
            info!("Deleted settings");
        }
        Ok(removed)
    }
}
