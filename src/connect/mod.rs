//! Site connection: remote handoff and persisted settings
//!
//! - [`client`]: the remote "connect" endpoint
//! - [`settings`]: the single `PluginSettings` record

pub mod client;
pub mod settings;

pub use client::ConnectClient;
pub use settings::PluginSettings;
