//! Cache layer that orchestrates caching logic with network fetching.

use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use super::storage::CacheStorage;
#[cfg(test)]
use super::storage::MemoryStorage;
use super::traits::{CacheResult, Cacheable, QueryKey};
use crate::error::Result;
use crate::pagination::PaginatedResult;

/// Cache layer that manages page caching and network fetching.
///
/// This layer sits between the application and the network client. Each
/// layer owns its own storage, so independent layers never share entries.
pub struct CacheLayer<T> {
  storage: Arc<dyn CacheStorage<T>>,
}

impl<T: Cacheable> CacheLayer<T> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: impl CacheStorage<T> + 'static) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  /// Create a cache layer backed by a fresh in-memory store.
  #[cfg(test)]
  pub fn in_memory() -> Self {
    Self::new(MemoryStorage::new())
  }

  #[cfg(test)]
  pub fn storage(&self) -> &dyn CacheStorage<T> {
    self.storage.as_ref()
  }

  /// Fetch a page with cache-first strategy.
  ///
  /// 1. Check cache - if present, return it without calling `fetcher`
  /// 2. Otherwise fetch from network
  /// 3. Store the page under the query's key
  ///
  /// A failed fetch leaves the cache untouched.
  pub async fn fetch_page<K, F, Fut>(
    &self,
    query: &K,
    fetcher: F,
  ) -> Result<CacheResult<Arc<PaginatedResult<T>>>>
  where
    K: QueryKey + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<PaginatedResult<T>>>,
  {
    let key = query.cache_key();

    if let Some(cached) = self.storage.get(&key)? {
      debug!(key = %key, "cache hit for {}", query.description());
      return Ok(CacheResult::from_cache(cached.page, cached.cached_at));
    }

    debug!(key = %key, "cache miss for {}", query.description());
    let page = fetcher().await?;
    let page = self.storage.set(&key, page)?;
    Ok(CacheResult::from_network(page))
  }

  /// Find an entity in any cached page, falling back to `fetcher`.
  ///
  /// Pages are scanned in storage iteration order and the first match wins.
  /// A fetched entity is not added to the page cache.
  pub async fn find_or_fetch<F, Fut>(&self, identity: &str, fetcher: F) -> Result<CacheResult<T>>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    let found = self.storage.values()?.into_iter().find_map(|cached| {
      cached
        .page
        .items
        .iter()
        .find(|item| item.identity() == identity)
        .cloned()
        .map(|item| (item, cached.cached_at))
    });

    if let Some((item, cached_at)) = found {
      debug!("{} {} found in cached pages", T::entity_type(), identity);
      return Ok(CacheResult::from_cache(item, cached_at));
    }

    let item = fetcher().await?;
    Ok(CacheResult::from_network(item))
  }

  /// Drop every cached page.
  pub fn invalidate(&self) -> Result<()> {
    self.storage.clear()
  }
}

impl<T> Clone for CacheLayer<T> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::NoopStorage;
  use crate::error::Error;
  use reqwest::StatusCode;
  use std::sync::atomic::{AtomicU32, Ordering};

  #[derive(Debug, Clone, PartialEq)]
  struct Item(String);

  impl Cacheable for Item {
    fn identity(&self) -> &str {
      &self.0
    }

    fn entity_type() -> &'static str {
      "item"
    }
  }

  struct Key(&'static str);

  impl QueryKey for Key {
    fn cache_key(&self) -> String {
      self.0.to_string()
    }

    fn description(&self) -> String {
      format!("test query {}", self.0)
    }
  }

  fn page(names: &[&str]) -> PaginatedResult<Item> {
    PaginatedResult {
      items: names.iter().map(|n| Item(n.to_string())).collect(),
      pagination: None,
    }
  }

  fn status_error() -> Error {
    Error::Status {
      status: StatusCode::INTERNAL_SERVER_ERROR,
      url: "http://test/items".to_string(),
    }
  }

  #[tokio::test]
  async fn test_second_fetch_is_served_from_cache() {
    let layer = CacheLayer::in_memory();
    let calls = AtomicU32::new(0);

    let first = layer
      .fetch_page(&Key("a"), || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(page(&["ana"]))
      })
      .await
      .unwrap();
    let second = layer
      .fetch_page(&Key("a"), || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(page(&["bob"]))
      })
      .await
      .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.source, crate::cache::CacheSource::Network);
    assert!(second.is_cached());
    assert!(Arc::ptr_eq(&first.data, &second.data));
  }

  #[tokio::test]
  async fn test_miss_populates_storage() {
    let layer = CacheLayer::in_memory();
    assert!(layer.storage().get("a").unwrap().is_none());

    let result = layer
      .fetch_page(&Key("a"), || async { Ok(page(&["ana"])) })
      .await
      .unwrap();

    let stored = layer.storage().get("a").unwrap().unwrap();
    assert!(Arc::ptr_eq(&stored.page, &result.data));
  }

  #[tokio::test]
  async fn test_failed_fetch_is_not_cached() {
    let layer: CacheLayer<Item> = CacheLayer::in_memory();

    let result = layer
      .fetch_page(&Key("a"), || async { Err(status_error()) })
      .await;

    assert!(matches!(result, Err(Error::Status { .. })));
    assert!(layer.storage().get("a").unwrap().is_none());
  }

  #[tokio::test]
  async fn test_find_prefers_cached_pages() {
    let layer = CacheLayer::in_memory();
    layer
      .fetch_page(&Key("a"), || async { Ok(page(&["ana", "bob"])) })
      .await
      .unwrap();
    layer
      .fetch_page(&Key("b"), || async { Ok(page(&["cid"])) })
      .await
      .unwrap();

    let found = layer
      .find_or_fetch("cid", || async { Err(status_error()) })
      .await
      .unwrap();

    assert_eq!(found.data, Item("cid".to_string()));
    assert!(found.is_cached());
  }

  #[tokio::test]
  async fn test_find_falls_back_to_fetcher() {
    let layer = CacheLayer::in_memory();
    layer
      .fetch_page(&Key("a"), || async { Ok(page(&["ana"])) })
      .await
      .unwrap();

    let found = layer
      .find_or_fetch("dee", || async { Ok(Item("dee".to_string())) })
      .await
      .unwrap();

    assert_eq!(found.source, crate::cache::CacheSource::Network);
    // Fetched entities stay out of the page cache
    assert_eq!(layer.storage().values().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_noop_storage_always_fetches() {
    let layer = CacheLayer::new(NoopStorage);
    let calls = AtomicU32::new(0);

    for _ in 0..2 {
      layer
        .fetch_page(&Key("a"), || async {
          calls.fetch_add(1, Ordering::SeqCst);
          Ok(page(&["ana"]))
        })
        .await
        .unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_invalidate_clears_pages() {
    let layer = CacheLayer::in_memory();
    layer
      .fetch_page(&Key("a"), || async { Ok(page(&["ana"])) })
      .await
      .unwrap();

    layer.invalidate().unwrap();
    assert!(layer.storage().get("a").unwrap().is_none());
  }
}
