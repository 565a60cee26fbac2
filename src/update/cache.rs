//! TTL-bounded cache for the latest release descriptor

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RELEASE_TRANSIENT;
use crate::error::StoreError;
use crate::store::TransientStore;
use crate::update::release::ReleaseDescriptor;

/// A release descriptor together with the moment it was fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedRelease {
    pub release: ReleaseDescriptor,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRelease {
    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now.signed_duration_since(self.fetched_at);
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => age >= ttl,
            Err(_) => false,
        }
    }
}

/// Single-entry release cache stored as a host transient.
///
/// `put` always overwrites; there is no merge with the previous entry.
pub struct ReleaseCache {
    store: Arc<dyn TransientStore>,
    ttl: Duration,
}

impl ReleaseCache {
    pub fn new(store: Arc<dyn TransientStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self) -> Result<Option<CachedRelease>, StoreError> {
        self.get_at(Utc::now())
    }

    /// Returns the cached entry unless it is missing or `now - fetched_at >= ttl`
    pub fn get_at(&self, now: DateTime<Utc>) -> Result<Option<CachedRelease>, StoreError> {
        let Some(raw) = self.store.get_transient(RELEASE_TRANSIENT)? else {
            return Ok(None);
        };

        let cached: CachedRelease = match serde_json::from_str(&raw) {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Discarding undecodable cached release: {}", e);
                self.store.delete_transient(RELEASE_TRANSIENT)?;
                return Ok(None);
            }
        };

        if cached.is_expired(now, self.ttl) {
            debug!("Cached release {} expired", cached.release.tag);
            return Ok(None);
        }

        Ok(Some(cached))
    }

    pub fn put(&self, release: ReleaseDescriptor) -> Result<CachedRelease, StoreError> {
        self.put_at(release, Utc::now())
    }

    pub fn put_at(
        &self,
        release: ReleaseDescriptor,
        fetched_at: DateTime<Utc>,
    ) -> Result<CachedRelease, StoreError> {
        let cached = CachedRelease {
            release,
            fetched_at,
        };
        let raw = serde_json::to_string(&cached)?;
        self.store.set_transient(RELEASE_TRANSIENT, &raw, self.ttl)?;
        debug!("Cached release {}", cached.release.tag);
        Ok(cached)
    }

    /// Drops the cached entry so the next check performs a live fetch
    pub fn invalidate(&self) -> Result<bool, StoreError> {
        self.store.delete_transient(RELEASE_TRANSIENT)
    }
}
