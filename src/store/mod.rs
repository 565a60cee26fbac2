//! Host persistence: named options and expiring transients
//!
//! Both traits mirror the host's key-value tables. [`SqliteStore`] implements
//! them on a local database so the plugin logic can run outside the host.

pub mod sqlite;

use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use crate::error::StoreError;

pub use sqlite::SqliteStore;

/// Persistent named values with no expiry
#[cfg_attr(test, automock)]
pub trait OptionStore: Send + Sync {
    fn get_option(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Overwrites any existing value
    fn set_option(&self, name: &str, value: &str) -> Result<(), StoreError>;

    /// Returns whether a value was removed
    fn delete_option(&self, name: &str) -> Result<bool, StoreError>;
}

/// Named values that expire after a time-to-live
#[cfg_attr(test, automock)]
pub trait TransientStore: Send + Sync {
    /// Returns `None` for missing or expired entries
    fn get_transient(&self, name: &str) -> Result<Option<String>, StoreError>;

    fn set_transient(&self, name: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    fn delete_transient(&self, name: &str) -> Result<bool, StoreError>;

    /// Drops every transient, returning how many were removed
    fn flush_transients(&self) -> Result<usize, StoreError>;
}
