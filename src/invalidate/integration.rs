//! Capability interface for optional caching layers

#[cfg(test)]
use mockall::automock;

use crate::error::IntegrationError;

/// A caching layer that may or may not be installed on the host
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CacheIntegration: Send + Sync {
    /// Human-readable name used in logs and diagnostics
    fn name(&self) -> &'static str;

    /// Probes whether the layer is installed and reachable right now
    fn is_present(&self) -> bool;

    /// Purges everything the layer has cached
    async fn clear(&self) -> Result<(), IntegrationError>;
}
