//! Local message cache.

mod model;
mod repository;

pub use model::{CacheEntry, normalize_flags};
pub use repository::{CacheRepository, default_cache_path};
