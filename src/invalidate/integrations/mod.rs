//! Concrete cache integrations

pub mod edge;
pub mod object_cache;
pub mod page_cache;

pub use edge::{CloudflareEdge, NginxProxy};
pub use object_cache::ObjectCache;
pub use page_cache::{PAGE_CACHE_PLUGINS, PageCacheKind, PageCachePlugin};
