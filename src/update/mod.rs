//! Self-update subsystem
//!
//! Polls the release feed, caches the latest release descriptor, compares it
//! with the installed version and rewrites the host's update-metadata record.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   GitHub    │────▶│    Cache    │◀────│   Checker   │
//! │  (fetch)    │     │ (transient) │     │  (compare)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                                ▼
//!                                         ┌─────────────┐
//!                                         │  Metadata   │
//!                                         │  (rewrite)  │
//!                                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`release`]: `ReleaseDescriptor` and the `ReleaseSource` trait
//! - [`github`]: GitHub Releases API client
//! - [`cache`]: TTL-bounded release cache on top of the host transients
//! - [`semver`]: version parsing and comparison
//! - [`checker`]: update decision and plugin details
//! - [`metadata`]: the host's update-metadata record

pub mod cache;
pub mod checker;
pub mod github;
pub mod metadata;
pub mod release;
pub mod semver;
