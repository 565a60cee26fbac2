//! Edge caches reached over HTTP: the CDN and the reverse proxy

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::{CdnConfig, ReverseProxyConfig};
use crate::error::IntegrationError;
use crate::invalidate::integration::CacheIntegration;

#[derive(Debug, Deserialize)]
struct PurgeResponse {
    success: bool,
    #[serde(default)]
    errors: Vec<PurgeMessage>,
}

#[derive(Debug, Deserialize)]
struct PurgeMessage {
    message: String,
}

/// Cloudflare zone cache, present when credentials are configured
pub struct CloudflareEdge {
    client: reqwest::Client,
    config: Option<CdnConfig>,
}

impl CloudflareEdge {
    pub fn new(client: reqwest::Client, config: Option<CdnConfig>) -> Self {
        Self { client, config }
    }
}

#[async_trait::async_trait]
impl CacheIntegration for CloudflareEdge {
    fn name(&self) -> &'static str {
        "Cloudflare"
    }

    fn is_present(&self) -> bool {
        self.config
            .as_ref()
            .is_some_and(|c| !c.zone_id.is_empty() && !c.api_token.is_empty())
    }

    async fn clear(&self) -> Result<(), IntegrationError> {
        let Some(config) = &self.config else {
            return Ok(());
        };

        let url = format!(
            "{}/zones/{}/purge_cache",
            config.api_base.trim_end_matches('/'),
            config.zone_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&config.api_token)
            .json(&json!({ "purge_everything": true }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Cloudflare purge returned status {}", status);
            return Err(IntegrationError::UnexpectedStatus(status.as_u16()));
        }

        let body: PurgeResponse = response.json().await?;
        if !body.success {
            let messages: Vec<_> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(IntegrationError::Other(format!(
                "Cloudflare purge rejected: {}",
                messages.join("; ")
            )));
        }

        debug!("Purged Cloudflare zone {}", config.zone_id);
        Ok(())
    }
}

/// Nginx proxy/fastcgi cache purged with a `PURGE` request
pub struct NginxProxy {
    client: reqwest::Client,
    config: Option<ReverseProxyConfig>,
}

impl NginxProxy {
    pub fn new(client: reqwest::Client, config: Option<ReverseProxyConfig>) -> Self {
        Self { client, config }
    }
}

#[async_trait::async_trait]
impl CacheIntegration for NginxProxy {
    fn name(&self) -> &'static str {
        "Nginx Helper"
    }

    fn is_present(&self) -> bool {
        self.config.as_ref().is_some_and(|c| !c.purge_url.is_empty())
    }

    async fn clear(&self) -> Result<(), IntegrationError> {
        let Some(config) = &self.config else {
            return Ok(());
        };

        let method = reqwest::Method::from_bytes(b"PURGE")
            .map_err(|e| IntegrationError::Other(e.to_string()))?;
        let response = self
            .client
            .request(method, &config.purge_url)
            .send()
            .await?;

        // 404 means nothing was cached under the purge key
        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            debug!("Purged reverse proxy cache at {}", config.purge_url);
            Ok(())
        } else {
            Err(IntegrationError::UnexpectedStatus(status.as_u16()))
        }
    }
}
