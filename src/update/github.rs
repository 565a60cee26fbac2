//! GitHub Releases API client

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::RELEASE_TIMEOUT_SECS;
use crate::error::ReleaseError;
use crate::update::release::{ReleaseDescriptor, ReleaseSource};

const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// Response from the GitHub "latest release" endpoint
#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    zipball_url: String,
    published_at: Option<DateTime<Utc>>,
    body: Option<String>,
}

impl TryFrom<LatestRelease> for ReleaseDescriptor {
    type Error = ReleaseError;

    fn try_from(release: LatestRelease) -> Result<Self, Self::Error> {
        if release.tag_name.trim().is_empty() {
            return Err(ReleaseError::MalformedResponse(
                "release has an empty tag_name".to_string(),
            ));
        }

        Ok(Self {
            tag: release.tag_name.trim().to_string(),
            html_url: release.html_url,
            download_url: release.zipball_url,
            published_at: release.published_at,
            notes: release.body.unwrap_or_default(),
        })
    }
}

/// Release client for a single GitHub repository
pub struct GitHubReleaseClient {
    client: reqwest::Client,
    /// Repository API base, e.g. `https://api.github.com/repos/owner/name`
    repo_api: String,
}

impl GitHubReleaseClient {
    pub fn new(repo_api: &str) -> Result<Self, ReleaseError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("flowganise/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(RELEASE_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            repo_api: repo_api.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ReleaseSource for GitHubReleaseClient {
    async fn fetch_latest_release(&self) -> Result<ReleaseDescriptor, ReleaseError> {
        let url = format!("{}/releases/latest", self.repo_api);
        debug!("Fetching latest release from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", ACCEPT_HEADER)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(ReleaseError::UnexpectedStatus(status.as_u16()));
        }

        let release: LatestRelease = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub release response: {}", e);
            ReleaseError::MalformedResponse(e.to_string())
        })?;

        release.try_into()
    }
}
