//! The plugin controller
//!
//! One `Plugin` is constructed by the entry point and handed to every hook
//! and handler; there is no global instance.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::{
    PLUGIN_BASENAME, PluginConfig, UPDATE_METADATA_OPTION, VERSION_OPTION,
};
use crate::connect::{ConnectClient, PluginSettings};
use crate::error::{ConnectError, IntegrationError, ReleaseError, StoreError};
use crate::invalidate::{CacheInvalidator, SweepReport};
use crate::store::{OptionStore, TransientStore};
use crate::tracking::TrackingSnippet;
use crate::update::cache::ReleaseCache;
use crate::update::checker::{PluginInfo, UpdateChecker, UpdateDecision};
use crate::update::github::GitHubReleaseClient;
use crate::update::metadata::UpdateMetadataRecord;
use crate::update::release::ReleaseSource;

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    Release(#[from] ReleaseError),
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Integration(#[from] IntegrationError),
}

pub struct Plugin {
    pub(crate) config: PluginConfig,
    pub(crate) options: Arc<dyn OptionStore>,
    pub(crate) transients: Arc<dyn TransientStore>,
    pub(crate) release_cache: Arc<ReleaseCache>,
    pub(crate) checker: UpdateChecker,
    pub(crate) invalidator: CacheInvalidator,
    pub(crate) connect: ConnectClient,
}

impl Plugin {
    /// Wires the production collaborators around a single store
    pub fn new<S>(config: PluginConfig, store: Arc<S>) -> Result<Self, InitError>
    where
        S: OptionStore + TransientStore + 'static,
    {
        let source = Arc::new(GitHubReleaseClient::new(&config.release_api_base)?);
        let invalidator = CacheInvalidator::with_defaults(store.clone(), &config)?;
        let connect = ConnectClient::new(&config.connect_api_base)?;

        Ok(Self::build(
            config,
            store.clone(),
            store,
            source,
            invalidator,
            connect,
        ))
    }

    /// Build a Plugin with custom collaborators
    pub fn build(
        config: PluginConfig,
        options: Arc<dyn OptionStore>,
        transients: Arc<dyn TransientStore>,
        source: Arc<dyn ReleaseSource>,
        invalidator: CacheInvalidator,
        connect: ConnectClient,
    ) -> Self {
        let release_cache = Arc::new(ReleaseCache::new(
            transients.clone(),
            Duration::from_secs(config.cache.release_ttl_secs),
        ));
        let checker = UpdateChecker::new(source, release_cache.clone());

        Self {
            config,
            options,
            transients,
            release_cache,
            checker,
            invalidator,
            connect,
        }
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// The running plugin version
    pub fn version(&self) -> &str {
        &self.config.installed_version
    }

    pub fn invalidator(&self) -> &CacheInvalidator {
        &self.invalidator
    }

    pub fn settings(&self) -> Result<Option<PluginSettings>, StoreError> {
        PluginSettings::load(self.options.as_ref())
    }

    /// Activation hook.
    ///
    /// Always drops the cached release and the host's update metadata so the
    /// next check is live. When the stored version marker differs from the
    /// running version every cache layer is swept and the marker updated.
    pub async fn activate(&self) -> Result<Option<SweepReport>, StoreError> {
        self.release_cache.invalidate()?;
        self.options.delete_option(UPDATE_METADATA_OPTION)?;

        let stored = self.options.get_option(VERSION_OPTION)?;
        if stored.as_deref() == Some(self.version()) {
            info!("Activated version {} (unchanged)", self.version());
            return Ok(None);
        }

        info!(
            "Activated version {} (previously {})",
            self.version(),
            stored.as_deref().unwrap_or("none")
        );
        let report = self.invalidator.clear_all().await;
        self.options.set_option(VERSION_OPTION, self.version())?;
        Ok(Some(report))
    }

    /// Deactivation hook
    pub async fn deactivate(&self) -> SweepReport {
        info!("Deactivating version {}", self.version());
        self.invalidator.clear_all().await
    }

    /// Post-install hook, run after the host finished upgrading this plugin
    pub async fn upgrade_complete(&self) -> SweepReport {
        let _ = self
            .release_cache
            .invalidate()
            .inspect_err(|e| warn!("Failed to invalidate release cache: {}", e));
        self.invalidator.clear_all().await
    }

    pub async fn clear_caches(&self) -> SweepReport {
        self.invalidator.clear_all().await
    }

    /// Update-check hook over an in-memory record.
    ///
    /// Skipped while the host has not populated `checked`. An unknown outcome
    /// leaves the record untouched.
    pub async fn apply_update_check(
        &self,
        record: &mut UpdateMetadataRecord,
    ) -> Option<UpdateDecision> {
        if record.checked.is_empty() {
            return None;
        }

        let installed = record
            .checked
            .get(PLUGIN_BASENAME)
            .cloned()
            .unwrap_or_else(|| self.version().to_string());

        let decision = self.checker.check_for_update(&installed).await?;
        record.apply(PLUGIN_BASENAME, &decision);
        Some(decision)
    }

    /// Update-check hook against the persisted record. Nothing is written
    /// when the check is skipped or its outcome is unknown.
    pub async fn run_update_check(&self) -> Result<Option<UpdateDecision>, StoreError> {
        let mut record = self.load_update_metadata()?;

        let Some(decision) = self.apply_update_check(&mut record).await else {
            return Ok(None);
        };

        if record.has_update(PLUGIN_BASENAME) {
            info!("Update to {} available", decision.target().version);
        }
        record.last_checked = Some(Utc::now());
        self.save_update_metadata(&record)?;
        Ok(Some(decision))
    }

    pub fn load_update_metadata(&self) -> Result<UpdateMetadataRecord, StoreError> {
        match self.options.get_option(UPDATE_METADATA_OPTION)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(UpdateMetadataRecord::default()),
        }
    }

    pub fn save_update_metadata(&self, record: &UpdateMetadataRecord) -> Result<(), StoreError> {
        self.options
            .set_option(UPDATE_METADATA_OPTION, &serde_json::to_string(record)?)?;
        Ok(())
    }

    /// "View details" hook
    pub async fn plugin_info(&self, slug: &str) -> Option<PluginInfo> {
        self.checker.fetch_description(slug).await
    }

    /// Tracking snippet for the front end, `None` while not connected
    pub fn tracking_snippet(&self) -> Result<Option<TrackingSnippet>, StoreError> {
        let settings = self.settings()?;
        Ok(TrackingSnippet::for_settings(
            settings.as_ref(),
            &self.config.script_url,
            self.version(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RELEASE_TRANSIENT;
    use crate::invalidate::integration::MockCacheIntegration;
    use crate::store::SqliteStore;
    use crate::update::release::{MockReleaseSource, ReleaseDescriptor};

    fn release(tag: &str) -> ReleaseDescriptor {
        ReleaseDescriptor {
            tag: tag.to_string(),
            html_url: "https://example.com/release".to_string(),
            download_url: "https://example.com/release.zip".to_string(),
            published_at: None,
            notes: String::new(),
        }
    }

    fn counting_integration(expected_clears: usize) -> MockCacheIntegration {
        let mut integration = MockCacheIntegration::new();
        integration.expect_name().return_const("page cache");
        integration.expect_is_present().return_const(true);
        integration
            .expect_clear()
            .times(expected_clears)
            .returning(|| Ok(()));
        integration
    }

    fn plugin(
        store: Arc<SqliteStore>,
        source: MockReleaseSource,
        integration: MockCacheIntegration,
    ) -> Plugin {
        let config = PluginConfig {
            installed_version: "1.1.0".to_string(),
            ..PluginConfig::default()
        };
        let mut invalidator = CacheInvalidator::new(store.clone());
        invalidator.register(Box::new(integration));
        Plugin::build(
            config,
            store.clone(),
            store,
            Arc::new(source),
            invalidator,
            ConnectClient::new("http://127.0.0.1:1").unwrap(),
        )
    }

    fn store() -> Arc<SqliteStore> {
        Arc::new(SqliteStore::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn activate_sweeps_caches_only_when_version_changes() {
        let store = store();
        store.set_option(VERSION_OPTION, "1.0.0").unwrap();
        let plugin = plugin(store.clone(), MockReleaseSource::new(), counting_integration(1));

        let first = plugin.activate().await.unwrap();
        let second = plugin.activate().await.unwrap();

        assert_eq!(first.unwrap().cleared, vec!["page cache"]);
        assert_eq!(second, None);
        assert_eq!(
            store.get_option(VERSION_OPTION).unwrap(),
            Some("1.1.0".to_string())
        );
    }

    #[tokio::test]
    async fn activate_drops_release_cache_and_update_metadata() {
        let store = store();
        store.set_option(VERSION_OPTION, "1.1.0").unwrap();
        store
            .set_transient(RELEASE_TRANSIENT, "{}", Duration::from_secs(60))
            .unwrap();
        store.set_option(UPDATE_METADATA_OPTION, "{}").unwrap();
        let plugin = plugin(store.clone(), MockReleaseSource::new(), counting_integration(0));

        plugin.activate().await.unwrap();

        assert_eq!(store.get_transient(RELEASE_TRANSIENT).unwrap(), None);
        assert_eq!(store.get_option(UPDATE_METADATA_OPTION).unwrap(), None);
    }

    #[tokio::test]
    async fn deactivate_and_upgrade_complete_sweep_caches() {
        let plugin = plugin(store(), MockReleaseSource::new(), counting_integration(2));

        plugin.deactivate().await;
        plugin.upgrade_complete().await;
    }

    #[tokio::test]
    async fn apply_update_check_skips_record_without_checked_versions() {
        let mut source = MockReleaseSource::new();
        source.expect_fetch_latest_release().times(0);
        let plugin = plugin(store(), source, counting_integration(0));
        let mut record = UpdateMetadataRecord::default();

        assert_eq!(plugin.apply_update_check(&mut record).await, None);
        assert_eq!(record, UpdateMetadataRecord::default());
    }

    #[tokio::test]
    async fn apply_update_check_leaves_record_untouched_on_failure() {
        let mut source = MockReleaseSource::new();
        source
            .expect_fetch_latest_release()
            .returning(|| Err(ReleaseError::UnexpectedStatus(500)));
        let plugin = plugin(store(), source, counting_integration(0));

        let mut record = UpdateMetadataRecord::default();
        record
            .checked
            .insert(PLUGIN_BASENAME.to_string(), "1.1.0".to_string());
        record.apply(
            PLUGIN_BASENAME,
            &UpdateDecision::UpToDate(crate::update::checker::UpdateTarget {
                version: "1.1.0".to_string(),
                url: String::new(),
                download_url: String::new(),
            }),
        );
        let before = record.clone();

        assert_eq!(plugin.apply_update_check(&mut record).await, None);
        assert_eq!(record, before);
    }

    #[tokio::test]
    async fn run_update_check_persists_decision() {
        let mut source = MockReleaseSource::new();
        source
            .expect_fetch_latest_release()
            .times(1)
            .returning(|| Ok(release("1.2.0")));
        let store = store();
        let plugin = plugin(store.clone(), source, counting_integration(0));
        let mut seeded = UpdateMetadataRecord::default();
        seeded
            .checked
            .insert(PLUGIN_BASENAME.to_string(), "1.1.0".to_string());
        plugin.save_update_metadata(&seeded).unwrap();

        let decision = plugin.run_update_check().await.unwrap().unwrap();

        assert!(decision.is_update_available());
        let record = plugin.load_update_metadata().unwrap();
        assert_eq!(record.response[PLUGIN_BASENAME].new_version, "1.2.0");
        assert!(record.last_checked.is_some());
    }

    #[tokio::test]
    async fn run_update_check_is_skipped_before_the_host_scans() {
        let mut source = MockReleaseSource::new();
        source.expect_fetch_latest_release().times(0);
        let store = store();
        let plugin = plugin(store.clone(), source, counting_integration(0));

        assert_eq!(plugin.run_update_check().await.unwrap(), None);
        assert_eq!(store.get_option(UPDATE_METADATA_OPTION).unwrap(), None);
    }
}
