use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Time-related constants
// =============================================================================

/// Lifetime of the cached release descriptor in seconds (12 hours)
pub const RELEASE_CACHE_TTL_SECS: u64 = 12 * 60 * 60;

/// Lifetime of the cached connect API response in seconds (1 hour)
pub const CONNECT_CACHE_TTL_SECS: u64 = 60 * 60;

/// Timeout for the release API request in seconds
pub const RELEASE_TIMEOUT_SECS: u64 = 10;

/// Timeout for the connect API request in seconds
pub const CONNECT_TIMEOUT_SECS: u64 = 15;

/// Timeout for edge cache purge requests in seconds
pub const PURGE_TIMEOUT_SECS: u64 = 15;

// =============================================================================
// Storage keys
// =============================================================================

/// Option holding the persisted `PluginSettings`
pub const SETTINGS_OPTION: &str = "flowganise_settings";

/// Option holding the version that was running at the last activation
pub const VERSION_OPTION: &str = "flowganise_version";

/// Option holding the host's update-metadata record
pub const UPDATE_METADATA_OPTION: &str = "update_plugins";

/// Transient caching the raw connect API response
pub const CONNECT_RESPONSE_TRANSIENT: &str = "flowganise_api_response";

/// Transient caching the latest release descriptor
pub const RELEASE_TRANSIENT: &str = "flowganise_github_api_response";

// =============================================================================
// Plugin identity
// =============================================================================

pub const PLUGIN_NAME: &str = "Flowganise Analytics";
pub const PLUGIN_SLUG: &str = "flowganise";
pub const PLUGIN_BASENAME: &str = "flowganise-analytics/flowganise-analytics.php";
pub const PLUGIN_HOMEPAGE: &str = "https://flowganise.com";
pub const PLUGIN_AUTHOR: &str = "<a href=\"https://flowganise.com\">Flowganise</a>";
pub const REQUIRES_HOST_VERSION: &str = "5.0";
pub const TESTED_HOST_VERSION: &str = "6.4.2";
pub const REQUIRES_PHP_VERSION: &str = "7.2";

/// Anti-forgery token action shared by every admin request
pub const NONCE_ACTION: &str = "flowganise_connect";

/// Capability required to call any admin handler
pub const ADMIN_CAPABILITY: &str = "manage_options";

const DEFAULT_RELEASE_API_BASE: &str =
    "https://api.github.com/repos/Flowganise/flowganise-wp-release";
const DEFAULT_CONNECT_API_BASE: &str = "https://backend.flowganise.com/api";
const DEFAULT_SCRIPT_URL: &str = "https://script.flowganise.com/";
const DEFAULT_CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Plugin configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginConfig {
    /// Canonical site URL reported to the connect API
    pub site_url: String,
    /// Version of the plugin currently installed on the host
    pub installed_version: String,
    pub release_api_base: String,
    pub connect_api_base: String,
    pub script_url: String,
    /// Host content directory (holds `plugins/` and `cache/`)
    pub content_dir: PathBuf,
    pub nonce_secret: String,
    pub cache: CacheConfig,
    pub cdn: Option<CdnConfig>,
    pub reverse_proxy: Option<ReverseProxyConfig>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            site_url: "http://localhost".to_string(),
            installed_version: env!("CARGO_PKG_VERSION").to_string(),
            release_api_base: DEFAULT_RELEASE_API_BASE.to_string(),
            connect_api_base: DEFAULT_CONNECT_API_BASE.to_string(),
            script_url: DEFAULT_SCRIPT_URL.to_string(),
            content_dir: PathBuf::from("wp-content"),
            nonce_secret: String::new(),
            cache: CacheConfig::default(),
            cdn: None,
            reverse_proxy: None,
        }
    }
}

impl PluginConfig {
    /// Loads the configuration from a JSON file.
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Release descriptor lifetime in seconds
    pub release_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            release_ttl_secs: RELEASE_CACHE_TTL_SECS,
        }
    }
}

/// Cloudflare edge cache credentials
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CdnConfig {
    pub zone_id: String,
    pub api_token: String,
    #[serde(default = "default_cloudflare_api_base")]
    pub api_base: String,
}

fn default_cloudflare_api_base() -> String {
    DEFAULT_CLOUDFLARE_API_BASE.to_string()
}

/// Reverse proxy (nginx fastcgi/proxy cache) purge endpoint
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReverseProxyConfig {
    pub purge_url: String,
}

/// Returns the path to the data directory for flowganise.
/// Uses $XDG_DATA_HOME/flowganise if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/flowganise,
/// or ./flowganise if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the database file.
pub fn db_path() -> PathBuf {
    data_dir().join("flowganise.db")
}

/// Returns the path to the default configuration file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("flowganise.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("flowganise")
}
