//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};

/// Trait for entities that can be found inside cached pages.
pub trait Cacheable: Clone + Send + Sync + 'static {
  /// Unique identifier for this entity (e.g., a username)
  fn identity(&self) -> &str;

  /// Entity type name used in log output (e.g., "member")
  fn entity_type() -> &'static str;
}

/// A query whose results can be cached.
///
/// Implementors build `cache_key` from an explicit field list so that equal
/// queries always produce equal keys.
pub trait QueryKey {
  /// Deterministic key for this query
  fn cache_key(&self) -> String;

  /// Human-readable description for logging
  fn description(&self) -> String;
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }

  pub fn is_cached(&self) -> bool {
    self.source == CacheSource::Cache
  }
}

/// Indicates where data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from network
  Network,
  /// Served from the in-memory cache without a request
  Cache,
}
