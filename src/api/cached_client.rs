//! Members client that wraps ApiClient with transparent page caching.

use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::cache::{CacheLayer, CacheResult, MemoryStorage, NoopStorage};
use crate::error::{Error, Result};
use crate::pagination::PaginatedResult;

use super::client::ApiClient;
use super::params::{CurrentUser, LikesParams, UserParams};
use super::types::Member;

/// What a successful mutation does to the member page cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidationPolicy {
  /// Leave cached pages alone; they may show stale members
  #[default]
  Never,
  /// Drop every cached members page
  OnMutation,
}

/// Members client with transparent caching support.
///
/// Member pages are cached per query. Mutations patch the flat list of
/// known members, not the cached pages, unless the invalidation policy
/// says otherwise.
#[derive(Clone)]
pub struct CachedMembersClient {
  inner: ApiClient,
  cache: CacheLayer<Member>,
  policy: InvalidationPolicy,
  user: CurrentUser,
  user_params: Arc<Mutex<UserParams>>,
  known: Arc<Mutex<Vec<Member>>>,
}

impl CachedMembersClient {
  pub fn new(inner: ApiClient, user: CurrentUser, cache_enabled: bool) -> Self {
    let cache = if cache_enabled {
      CacheLayer::new(MemoryStorage::new())
    } else {
      CacheLayer::new(NoopStorage)
    };
    let user_params = UserParams::for_user(&user);

    Self {
      inner,
      cache,
      policy: InvalidationPolicy::default(),
      user,
      user_params: Arc::new(Mutex::new(user_params)),
      known: Arc::new(Mutex::new(Vec::new())),
    }
  }

  pub fn with_invalidation(mut self, policy: InvalidationPolicy) -> Self {
    self.policy = policy;
    self
  }

  /// Replace the seeded default query (e.g. with configured page size).
  pub fn with_default_params(mut self, params: UserParams) -> Self {
    self.user_params = Arc::new(Mutex::new(params));
    self
  }

  pub fn current_user(&self) -> &CurrentUser {
    &self.user
  }

  pub fn user_params(&self) -> Result<UserParams> {
    Ok(self.lock_params()?.clone())
  }

  pub fn set_user_params(&self, params: UserParams) -> Result<()> {
    *self.lock_params()? = params;
    Ok(())
  }

  /// Restore the query seeded from the current user.
  pub fn reset_user_params(&self) -> Result<UserParams> {
    let params = UserParams::for_user(&self.user);
    *self.lock_params()? = params.clone();
    Ok(params)
  }

  /// Get a page of members, from cache when the same query was seen before.
  pub async fn get_members(
    &self,
    params: &UserParams,
  ) -> Result<CacheResult<Arc<PaginatedResult<Member>>>> {
    self
      .cache
      .fetch_page(params, || {
        let inner = self.inner.clone();
        let params = params.clone();
        async move { inner.get_members(&params).await }
      })
      .await
  }

  /// Get a single member, looking through cached pages first.
  pub async fn get_member(&self, username: &str) -> Result<CacheResult<Member>> {
    self
      .cache
      .find_or_fetch(username, || {
        let inner = self.inner.clone();
        let username = username.to_string();
        async move { inner.get_member(&username).await }
      })
      .await
  }

  /// Get a page of likes (not cached - like state changes with every add_like).
  pub async fn get_likes(&self, params: &LikesParams) -> Result<PaginatedResult<Member>> {
    debug!("fetching {}", params.description());
    self.inner.get_likes(params).await
  }

  /// Update a member profile and patch the known members list.
  pub async fn update_member(&self, member: &Member) -> Result<()> {
    self.inner.update_member(member).await?;

    let mut known = self.lock_known()?;
    match known.iter_mut().find(|m| m.username == member.username) {
      Some(existing) => *existing = member.clone(),
      None => known.push(member.clone()),
    }
    drop(known);

    info!("updated member {}", member.username);
    self.after_mutation()
  }

  pub async fn set_main_photo(&self, photo_id: u64) -> Result<()> {
    self.inner.set_main_photo(photo_id).await?;

    let mut known = self.lock_known()?;
    for member in known.iter_mut() {
      member.set_main_photo(photo_id);
    }
    drop(known);

    info!("photo {} set as main", photo_id);
    self.after_mutation()
  }

  pub async fn delete_photo(&self, photo_id: u64) -> Result<()> {
    self.inner.delete_photo(photo_id).await?;

    let mut known = self.lock_known()?;
    for member in known.iter_mut() {
      member.remove_photo(photo_id);
    }
    drop(known);

    info!("photo {} deleted", photo_id);
    self.after_mutation()
  }

  /// Like a member. Members carry no like state, so only the policy applies.
  pub async fn add_like(&self, username: &str) -> Result<()> {
    self.inner.add_like(username).await?;
    info!("liked {}", username);
    self.after_mutation()
  }

  /// Add a member to the known members list.
  pub fn remember(&self, member: Member) -> Result<()> {
    let mut known = self.lock_known()?;
    if !known.iter().any(|m| m.username == member.username) {
      known.push(member);
    }
    Ok(())
  }

  pub fn known_members(&self) -> Result<Vec<Member>> {
    Ok(self.lock_known()?.clone())
  }

  fn after_mutation(&self) -> Result<()> {
    if self.policy == InvalidationPolicy::OnMutation {
      info!("clearing cached member pages after mutation");
      self.cache.invalidate()?;
    }
    Ok(())
  }

  fn lock_known(&self) -> Result<std::sync::MutexGuard<'_, Vec<Member>>> {
    self.known.lock().map_err(|_| Error::LockPoisoned)
  }

  fn lock_params(&self) -> Result<std::sync::MutexGuard<'_, UserParams>> {
    self.user_params.lock().map_err(|_| Error::LockPoisoned)
  }

  #[cfg(test)]
  fn cache(&self) -> &CacheLayer<Member> {
    &self.cache
  }
}
