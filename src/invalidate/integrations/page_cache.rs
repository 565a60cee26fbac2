//! Page-cache plugins that keep their output under the host content directory

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::IntegrationError;
use crate::invalidate::integration::CacheIntegration;

/// Static description of a page-cache plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCacheKind {
    pub name: &'static str,
    /// Any of these directories under `plugins/` marks the plugin as installed
    pub plugin_dirs: &'static [&'static str],
    /// Directory under `cache/` holding the generated pages
    pub cache_dir: &'static str,
}

/// Known page-cache plugins, in sweep order
pub const PAGE_CACHE_PLUGINS: &[PageCacheKind] = &[
    PageCacheKind {
        name: "WP Super Cache",
        plugin_dirs: &["wp-super-cache"],
        cache_dir: "supercache",
    },
    PageCacheKind {
        name: "W3 Total Cache",
        plugin_dirs: &["w3-total-cache"],
        cache_dir: "page_enhanced",
    },
    PageCacheKind {
        name: "WP Rocket",
        plugin_dirs: &["wp-rocket"],
        cache_dir: "wp-rocket",
    },
    PageCacheKind {
        name: "LiteSpeed Cache",
        plugin_dirs: &["litespeed-cache"],
        cache_dir: "litespeed",
    },
    PageCacheKind {
        name: "Breeze",
        plugin_dirs: &["breeze"],
        cache_dir: "breeze",
    },
    PageCacheKind {
        name: "CDN Enabler",
        plugin_dirs: &["cdn-enabler"],
        cache_dir: "cdn-enabler",
    },
    PageCacheKind {
        name: "Swift Performance",
        plugin_dirs: &["swift-performance-lite", "swift-performance"],
        cache_dir: "swift-performance",
    },
    PageCacheKind {
        name: "SiteGround Optimizer",
        plugin_dirs: &["sg-cachepress"],
        cache_dir: "sgo-cache",
    },
    PageCacheKind {
        name: "WP Fastest Cache",
        plugin_dirs: &["wp-fastest-cache"],
        cache_dir: "all",
    },
    PageCacheKind {
        name: "Autoptimize",
        plugin_dirs: &["autoptimize"],
        cache_dir: "autoptimize",
    },
];

/// A page-cache plugin bound to a concrete content directory
pub struct PageCachePlugin {
    kind: PageCacheKind,
    content_dir: PathBuf,
}

impl PageCachePlugin {
    pub fn new(kind: PageCacheKind, content_dir: &Path) -> Self {
        Self {
            kind,
            content_dir: content_dir.to_path_buf(),
        }
    }

    fn cache_path(&self) -> PathBuf {
        self.content_dir.join("cache").join(self.kind.cache_dir)
    }
}

#[async_trait::async_trait]
impl CacheIntegration for PageCachePlugin {
    fn name(&self) -> &'static str {
        self.kind.name
    }

    // Blocking stat calls on the sweep's task. Switch to tokio::fs::metadata
    // if the probe becomes async.
    fn is_present(&self) -> bool {
        let plugins = self.content_dir.join("plugins");
        self.kind
            .plugin_dirs
            .iter()
            .any(|dir| plugins.join(dir).is_dir())
    }

    async fn clear(&self) -> Result<(), IntegrationError> {
        let cache_path = self.cache_path();
        let removed = empty_dir(&cache_path).await?;
        debug!(
            "Removed {} entries from {}",
            removed,
            cache_path.display()
        );
        Ok(())
    }
}

/// Removes every entry inside `dir`, keeping the directory itself.
/// A missing directory counts as already empty.
async fn empty_dir(dir: &Path) -> Result<usize, IntegrationError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_dir() {
            tokio::fs::remove_dir_all(&path).await?;
        } else {
            tokio::fs::remove_file(&path).await?;
        }
        removed += 1;
    }

    Ok(removed)
}
