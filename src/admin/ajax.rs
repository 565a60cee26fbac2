//! AJAX handlers for the settings page
//!
//! Every handler verifies the anti-forgery token and the administrator
//! capability before doing anything, and every failure is turned into a
//! `{"success": false, "data": <message>}` envelope.

use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{info, warn};

use crate::admin::diagnostics::Diagnostics;
use crate::admin::guard::RequestGuard;
use crate::config::{
    ADMIN_CAPABILITY, CONNECT_CACHE_TTL_SECS, CONNECT_RESPONSE_TRANSIENT, NONCE_ACTION,
};
use crate::connect::PluginSettings;
use crate::error::{ConnectError, StoreError};
use crate::plugin::Plugin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AjaxAction {
    Connect,
    Disconnect,
    SaveSettings,
    Debug,
}

impl AjaxAction {
    /// Name the host routes the request by
    pub fn hook_name(&self) -> &'static str {
        match self {
            AjaxAction::Connect => "flowganise_connect",
            AjaxAction::Disconnect => "flowganise_disconnect",
            AjaxAction::SaveSettings => "flowganise_save_settings",
            AjaxAction::Debug => "flowganise_debug",
        }
    }
}

impl FromStr for AjaxAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("flowganise_").unwrap_or(s) {
            "connect" => Ok(AjaxAction::Connect),
            "disconnect" => Ok(AjaxAction::Disconnect),
            "save_settings" => Ok(AjaxAction::SaveSettings),
            "debug" => Ok(AjaxAction::Debug),
            _ => Err(format!("unknown action: {s}")),
        }
    }
}

/// A POSTed admin request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AjaxRequest {
    pub action: AjaxAction,
    pub nonce: String,
    pub organization_id: Option<String>,
    pub domain: Option<String>,
}

impl AjaxRequest {
    pub fn new(action: AjaxAction, nonce: &str) -> Self {
        Self {
            action,
            nonce: nonce.to_string(),
            organization_id: None,
            domain: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AjaxResponse {
    pub success: bool,
    pub data: Value,
}

impl AjaxResponse {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Value::String(message.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Invalid nonce")]
    InvalidToken,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Failed to update settings: {0}")]
    Store(#[from] StoreError),
}

impl Plugin {
    /// Runs one admin request to completion; never fails
    pub async fn handle_ajax(&self, guard: &dyn RequestGuard, request: &AjaxRequest) -> AjaxResponse {
        match self.dispatch_ajax(guard, request).await {
            Ok(data) => AjaxResponse::success(data),
            Err(e) => {
                warn!("{} failed: {}", request.action.hook_name(), e);
                AjaxResponse::error(e.to_string())
            }
        }
    }

    async fn dispatch_ajax(
        &self,
        guard: &dyn RequestGuard,
        request: &AjaxRequest,
    ) -> Result<Value, HandlerError> {
        if !guard.verify_token(NONCE_ACTION, &request.nonce) {
            return Err(HandlerError::InvalidToken);
        }
        if !guard.has_capability(ADMIN_CAPABILITY) {
            return Err(HandlerError::Unauthorized);
        }

        match request.action {
            AjaxAction::Connect => self.handle_connect().await,
            AjaxAction::Disconnect => self.handle_disconnect(),
            AjaxAction::SaveSettings => self.handle_save_settings(request),
            AjaxAction::Debug => self.handle_debug(),
        }
    }

    async fn handle_connect(&self) -> Result<Value, HandlerError> {
        let domain = self.config.site_url.trim_end_matches('/').to_string();

        let response = self.connect.connect(&domain).await?;
        let organization_id = response.organization_id.clone().unwrap_or_default();

        if let Ok(raw) = serde_json::to_string(&response) {
            let _ = self
                .transients
                .set_transient(
                    CONNECT_RESPONSE_TRANSIENT,
                    &raw,
                    Duration::from_secs(CONNECT_CACHE_TTL_SECS),
                )
                .inspect_err(|e| warn!("Failed to cache connect response: {}", e));
        }

        PluginSettings::new(&organization_id, &domain).save(self.options.as_ref())?;
        info!("Connected {} to Flowganise", domain);

        Ok(json!({
            "message": "Successfully connected with Flowganise",
            "organization_id": organization_id,
        }))
    }

    fn handle_disconnect(&self) -> Result<Value, HandlerError> {
        PluginSettings::delete(self.options.as_ref())?;
        let _ = self
            .transients
            .delete_transient(CONNECT_RESPONSE_TRANSIENT)
            .inspect_err(|e| warn!("Failed to drop cached connect response: {}", e));

        Ok(json!({
            "message": "Successfully disconnected from Flowganise",
        }))
    }

    fn handle_save_settings(&self, request: &AjaxRequest) -> Result<Value, HandlerError> {
        let organization_id = required_field(request.organization_id.as_deref(), "organization_id")?;
        let domain = required_field(request.domain.as_deref(), "domain")?;

        PluginSettings::new(organization_id, domain).save(self.options.as_ref())?;

        Ok(json!({
            "message": "Settings saved",
            "organization_id": organization_id,
        }))
    }

    fn handle_debug(&self) -> Result<Value, HandlerError> {
        let diagnostics = Diagnostics::collect(self)?;
        self.invalidator.clear_own_artifacts();
        serde_json::to_value(diagnostics).map_err(|e| HandlerError::Store(e.into()))
    }
}

fn required_field<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, HandlerError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(HandlerError::InvalidInput(format!("Missing {name}"))),
    }
}
