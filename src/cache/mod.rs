//! Generic page cache for paged collection queries.
//!
//! This module provides an API-agnostic caching mechanism that:
//! - Caches whole pages under a deterministic per-query key
//! - Serves repeated identical queries without a network request
//! - Finds single entities by scanning every cached page
//!
//! There is no expiry and no size bound; a cache lives as long as the
//! layer that owns it.

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{MemoryStorage, NoopStorage};
pub use traits::{CacheResult, CacheSource, Cacheable, QueryKey};
