//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::pagination::PaginatedResult;

/// A single cached page.
#[derive(Debug)]
pub struct CachedPage<T> {
  /// The cached page, shared with every caller that reads it
  pub page: Arc<PaginatedResult<T>>,
  /// When the page was stored
  pub cached_at: DateTime<Utc>,
}

impl<T> Clone for CachedPage<T> {
  fn clone(&self) -> Self {
    Self {
      page: Arc::clone(&self.page),
      cached_at: self.cached_at,
    }
  }
}

/// Trait for cache storage backends.
pub trait CacheStorage<T>: Send + Sync {
  /// Get the page stored under `key`.
  fn get(&self, key: &str) -> Result<Option<CachedPage<T>>>;

  /// Store a page under `key`, replacing any previous entry.
  fn set(&self, key: &str, page: PaginatedResult<T>) -> Result<Arc<PaginatedResult<T>>>;

  /// Snapshot of every cached page, in no particular order.
  fn values(&self) -> Result<Vec<CachedPage<T>>>;

  /// Drop every cached page.
  fn clear(&self) -> Result<()>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl<T: Send + Sync> CacheStorage<T> for NoopStorage {
  fn get(&self, _key: &str) -> Result<Option<CachedPage<T>>> {
    Ok(None) // Always miss
  }

  fn set(&self, _key: &str, page: PaginatedResult<T>) -> Result<Arc<PaginatedResult<T>>> {
    Ok(Arc::new(page)) // Discard
  }

  fn values(&self) -> Result<Vec<CachedPage<T>>> {
    Ok(Vec::new())
  }

  fn clear(&self) -> Result<()> {
    Ok(())
  }
}

/// Process-local page cache. Unbounded, no expiry.
pub struct MemoryStorage<T> {
  pages: Mutex<HashMap<String, CachedPage<T>>>,
}

impl<T> MemoryStorage<T> {
  pub fn new() -> Self {
    Self {
      pages: Mutex::new(HashMap::new()),
    }
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.pages.lock().map(|p| p.len()).unwrap_or(0)
  }
}

impl<T> Default for MemoryStorage<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Send + Sync> CacheStorage<T> for MemoryStorage<T> {
  fn get(&self, key: &str) -> Result<Option<CachedPage<T>>> {
    let pages = self.pages.lock().map_err(|_| Error::LockPoisoned)?;
    Ok(pages.get(key).cloned())
  }

  fn set(&self, key: &str, page: PaginatedResult<T>) -> Result<Arc<PaginatedResult<T>>> {
    let page = Arc::new(page);
    let mut pages = self.pages.lock().map_err(|_| Error::LockPoisoned)?;
    pages.insert(
      key.to_string(),
      CachedPage {
        page: Arc::clone(&page),
        cached_at: Utc::now(),
      },
    );
    Ok(page)
  }

  fn values(&self) -> Result<Vec<CachedPage<T>>> {
    let pages = self.pages.lock().map_err(|_| Error::LockPoisoned)?;
    Ok(pages.values().cloned().collect())
  }

  fn clear(&self) -> Result<()> {
    let mut pages = self.pages.lock().map_err(|_| Error::LockPoisoned)?;
    pages.clear();
    Ok(())
  }
}
