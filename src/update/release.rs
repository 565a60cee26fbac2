//! Release descriptor and the trait for fetching it

#[cfg(test)]
use mockall::automock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReleaseError;

/// The latest published artifact of the plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
    /// Version tag as published (may carry a leading `v`)
    pub tag: String,
    pub html_url: String,
    /// Archive location of the release
    pub download_url: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Free-text changelog
    pub notes: String,
}

/// Trait for fetching the latest release from a release feed
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetches the latest release descriptor
    ///
    /// # Returns
    /// * `Ok(ReleaseDescriptor)` - The latest published release
    /// * `Err(ReleaseError)` - Transport failure, non-200 status or undecodable body
    async fn fetch_latest_release(&self) -> Result<ReleaseDescriptor, ReleaseError>;
}
