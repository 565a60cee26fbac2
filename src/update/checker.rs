//! Update decision for the installed plugin

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{
    PLUGIN_AUTHOR, PLUGIN_HOMEPAGE, PLUGIN_NAME, PLUGIN_SLUG, REQUIRES_HOST_VERSION,
    TESTED_HOST_VERSION,
};
use crate::update::cache::ReleaseCache;
use crate::update::release::{ReleaseDescriptor, ReleaseSource};
use crate::update::semver::{compare_versions, normalize_version};

const DESCRIPTION: &str = r#"
<p>Integrates Flowganise Analytics with your WordPress site.</p>
<h4>Features</h4>
<ul>
    <li>One-click connection with your Flowganise account</li>
    <li>Automatic tracking script installation</li>
    <li>Simple WordPress admin interface</li>
    <li>No configuration needed</li>
</ul>
"#;

/// Version and archive locations carried by a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTarget {
    pub version: String,
    pub url: String,
    pub download_url: String,
}

/// Outcome of comparing the installed version with the latest release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    /// `version` is the newer release
    UpdateAvailable(UpdateTarget),
    /// `version` is the installed version
    UpToDate(UpdateTarget),
}

impl UpdateDecision {
    pub fn target(&self) -> &UpdateTarget {
        match self {
            UpdateDecision::UpdateAvailable(target) | UpdateDecision::UpToDate(target) => target,
        }
    }

    pub fn is_update_available(&self) -> bool {
        matches!(self, UpdateDecision::UpdateAvailable(_))
    }
}

/// Details shown by the host's "view details" dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub slug: String,
    pub version: String,
    pub author: String,
    pub homepage: String,
    pub requires: String,
    pub tested: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub download_link: String,
    pub sections: PluginSections,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginSections {
    pub description: String,
    pub changelog: String,
}

/// Compares the installed version against the latest known release
pub struct UpdateChecker {
    source: Arc<dyn ReleaseSource>,
    cache: Arc<ReleaseCache>,
}

impl UpdateChecker {
    pub fn new(source: Arc<dyn ReleaseSource>, cache: Arc<ReleaseCache>) -> Self {
        Self { source, cache }
    }

    /// Returns the decision for `installed_version`.
    ///
    /// `None` means the outcome is unknown (fetch failed or a version could
    /// not be parsed); callers must leave the host metadata untouched.
    pub async fn check_for_update(&self, installed_version: &str) -> Option<UpdateDecision> {
        let release = self.latest_release().await?;
        decide(installed_version, &release)
    }

    /// Returns plugin details for `slug`, or `None` when the slug belongs to
    /// another plugin or the release is unavailable.
    pub async fn fetch_description(&self, slug: &str) -> Option<PluginInfo> {
        if slug != PLUGIN_SLUG {
            return None;
        }

        let release = self.latest_release().await?;

        Some(PluginInfo {
            name: PLUGIN_NAME.to_string(),
            slug: PLUGIN_SLUG.to_string(),
            version: normalize_version(&release.tag).to_string(),
            author: PLUGIN_AUTHOR.to_string(),
            homepage: PLUGIN_HOMEPAGE.to_string(),
            requires: REQUIRES_HOST_VERSION.to_string(),
            tested: TESTED_HOST_VERSION.to_string(),
            last_updated: release.published_at,
            download_link: release.download_url.clone(),
            sections: PluginSections {
                description: DESCRIPTION.trim().to_string(),
                changelog: line_breaks_to_html(&release.notes),
            },
        })
    }

    /// Serves the cached release, fetching and caching it on a miss
    async fn latest_release(&self) -> Option<ReleaseDescriptor> {
        match self.cache.get() {
            Ok(Some(cached)) => {
                debug!("Using cached release {}", cached.release.tag);
                return Some(cached.release);
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to read release cache, fetching live: {}", e),
        }

        let release = self
            .source
            .fetch_latest_release()
            .await
            .inspect_err(|e| warn!("Failed to fetch latest release: {}", e))
            .ok()?;

        if let Err(e) = self.cache.put(release.clone()) {
            warn!("Failed to cache release {}: {}", release.tag, e);
        }

        Some(release)
    }
}

fn decide(installed_version: &str, release: &ReleaseDescriptor) -> Option<UpdateDecision> {
    let Some(ordering) = compare_versions(installed_version, &release.tag) else {
        warn!(
            "Cannot compare installed version {:?} with release tag {:?}",
            installed_version, release.tag
        );
        return None;
    };

    let decision = if ordering == Ordering::Less {
        info!(
            "Update available: {} -> {}",
            installed_version, release.tag
        );
        UpdateDecision::UpdateAvailable(UpdateTarget {
            version: normalize_version(&release.tag).to_string(),
            url: release.html_url.clone(),
            download_url: release.download_url.clone(),
        })
    } else {
        debug!("Installed version {} is current", installed_version);
        UpdateDecision::UpToDate(UpdateTarget {
            version: installed_version.to_string(),
            url: release.html_url.clone(),
            download_url: release.download_url.clone(),
        })
    };

    Some(decision)
}

fn line_breaks_to_html(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "<br />\n")
}
