use std::sync::Arc;

use tracing::debug;

use crate::error::IntegrationError;
use crate::invalidate::integration::CacheIntegration;
use crate::store::TransientStore;

/// The host's own object cache (transient storage); always present
pub struct ObjectCache {
    store: Arc<dyn TransientStore>,
}

impl ObjectCache {
    pub fn new(store: Arc<dyn TransientStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl CacheIntegration for ObjectCache {
    fn name(&self) -> &'static str {
        "Object cache"
    }

    fn is_present(&self) -> bool {
        true
    }

    async fn clear(&self) -> Result<(), IntegrationError> {
        let removed = self.store.flush_transients()?;
        debug!("Flushed {} transients", removed);
        Ok(())
    }
}
