//! Client for the remote "connect" endpoint
//!
//! Contract (v1): `GET {base}/connect?domain=<site url>`.
//! - `200` with `organization_id` connects the site
//! - `404`, or `200` with `"success": false`, means the domain is not registered
//! - any other status is an unexpected failure

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CONNECT_TIMEOUT_SECS;
use crate::error::ConnectError;

/// Body returned by the connect endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

pub struct ConnectClient {
    client: reqwest::Client,
    api_base: String,
}

impl ConnectClient {
    pub fn new(api_base: &str) -> Result<Self, ConnectError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("flowganise/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Asks the service which organization owns `domain`
    pub async fn connect(&self, domain: &str) -> Result<ConnectResponse, ConnectError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/connect", self.api_base),
            &[("domain", domain)],
        )
        .map_err(|e| ConnectError::InvalidEndpoint(e.to_string()))?;
        debug!("Requesting connection for {}", domain);

        let response = self
            .client
            .get(url)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ConnectError::NotRegistered);
        }
        if status != reqwest::StatusCode::OK {
            warn!("Connect API returned status {}", status);
            return Err(ConnectError::UnexpectedStatus(status.as_u16()));
        }

        let body: ConnectResponse = response
            .json()
            .await
            .map_err(|e| ConnectError::MalformedResponse(e.to_string()))?;

        if body.success == Some(false) {
            return Err(ConnectError::NotRegistered);
        }

        match body.organization_id.as_deref() {
            Some(id) if !id.trim().is_empty() => Ok(body),
            _ => Err(ConnectError::MalformedResponse(
                "missing organization_id".to_string(),
            )),
        }
    }
}
