//! Hand-written collaborators for integration tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use flowganise::admin::RequestGuard;
use flowganise::error::IntegrationError;
use flowganise::invalidate::CacheIntegration;

/// Cache integration that counts clears and can be told to fail
pub struct FakeIntegration {
    name: &'static str,
    present: bool,
    fail: bool,
    clears: Arc<AtomicUsize>,
}

impl FakeIntegration {
    pub fn new(name: &'static str, present: bool) -> Self {
        Self {
            name,
            present,
            fail: false,
            clears: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Shared counter of `clear` calls, readable after the fake is boxed
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.clears.clone()
    }
}

#[async_trait]
impl CacheIntegration for FakeIntegration {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_present(&self) -> bool {
        self.present
    }

    async fn clear(&self) -> Result<(), IntegrationError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(IntegrationError::Other(format!("{} exploded", self.name)))
        } else {
            Ok(())
        }
    }
}

/// Guard with fixed answers
pub struct StaticGuard {
    pub valid_token: bool,
    pub admin: bool,
}

impl StaticGuard {
    pub fn admin() -> Self {
        Self {
            valid_token: true,
            admin: true,
        }
    }
}

impl RequestGuard for StaticGuard {
    fn verify_token(&self, _action: &str, _token: &str) -> bool {
        self.valid_token
    }

    fn has_capability(&self, _capability: &str) -> bool {
        self.admin
    }
}
