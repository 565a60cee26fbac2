//! Host-side companion for the Flowganise analytics plugin
//!
//! # Modules
//!
//! - [`update`]: release polling, caching, version comparison and update metadata
//! - [`invalidate`]: cache invalidation fan-out over optional caching layers
//! - [`connect`]: connection handoff with the analytics service
//! - [`admin`]: guarded AJAX handlers and diagnostics
//! - [`tracking`]: the front-end tracking snippet
//! - [`plugin`]: the controller wiring everything together
//! - [`store`]: option and transient persistence

pub mod admin;
pub mod config;
pub mod connect;
pub mod error;
pub mod invalidate;
pub mod logging;
pub mod plugin;
pub mod store;
pub mod tracking;
pub mod update;
