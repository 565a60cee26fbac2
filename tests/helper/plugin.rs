//! Plugin test utilities

use std::sync::Arc;

use flowganise::config::PluginConfig;
use flowganise::connect::ConnectClient;
use flowganise::invalidate::{CacheIntegration, CacheInvalidator};
use flowganise::plugin::Plugin;
use flowganise::store::SqliteStore;
use flowganise::update::github::GitHubReleaseClient;

pub const SITE_URL: &str = "https://example.com";
pub const INSTALLED_VERSION: &str = "1.1.0";

/// Create a plugin talking to `api_url` for both the release feed and the
/// connect endpoint, backed by an in-memory store
pub fn create_test_plugin(
    api_url: &str,
    integrations: Vec<Box<dyn CacheIntegration>>,
) -> (Arc<SqliteStore>, Plugin) {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let config = PluginConfig {
        site_url: format!("{SITE_URL}/"),
        installed_version: INSTALLED_VERSION.to_string(),
        release_api_base: api_url.to_string(),
        connect_api_base: api_url.to_string(),
        ..PluginConfig::default()
    };

    let mut invalidator = CacheInvalidator::new(store.clone());
    for integration in integrations {
        invalidator.register(integration);
    }

    let plugin = Plugin::build(
        config,
        store.clone(),
        store.clone(),
        Arc::new(GitHubReleaseClient::new(api_url).unwrap()),
        invalidator,
        ConnectClient::new(api_url).unwrap(),
    );

    (store, plugin)
}

pub fn release_body(tag: &str) -> String {
    format!(
        r#"{{
            "tag_name": "{tag}",
            "html_url": "https://github.com/Flowganise/flowganise-wp-release/releases/tag/{tag}",
            "zipball_url": "https://api.github.com/repos/Flowganise/flowganise-wp-release/zipball/{tag}",
            "published_at": "2024-01-15T00:00:00Z",
            "body": "Changelog for {tag}"
        }}"#
    )
}
