use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;
use url::Url;

use crate::error::{Error, Result};
use crate::pagination::{decode_header, PaginatedResult, PAGINATION_HEADER};

use super::params::{LikesParams, UserParams};
use super::types::Member;

/// HTTP client for the members API
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  base: Url,
  token: Option<String>,
}

impl ApiClient {
  pub fn new(base: Url, token: Option<String>) -> Result<Self> {
    if base.cannot_be_a_base() {
      return Err(Error::InvalidBaseUrl(base.to_string()));
    }

    Ok(Self {
      client: Client::new(),
      base,
      token,
    })
  }

  /// Resolve `segments` below the base URL, keeping any base path prefix.
  fn url(&self, segments: &[&str]) -> Result<Url> {
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|_| Error::InvalidBaseUrl(self.base.to_string()))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  fn request(&self, method: Method, url: Url) -> RequestBuilder {
    let builder = self.client.request(method, url);
    match &self.token {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    }
  }

  async fn send(&self, builder: RequestBuilder) -> Result<Response> {
    let response = builder.send().await.map_err(Error::from_send)?;
    response.error_for_status().map_err(Error::from_send)
  }

  /// GET a paged collection, decoding the body and the pagination header
  async fn get_paginated<T: DeserializeOwned>(
    &self,
    collection: &str,
    query: &[(&'static str, String)],
  ) -> Result<PaginatedResult<T>> {
    let url = self.url(&[collection])?;
    let response = self
      .send(self.request(Method::GET, url).query(query))
      .await?;

    // Read the header before the body consumes the response
    let pagination = decode_header(response.headers().get(PAGINATION_HEADER))?;
    let items: Vec<T> = response.json().await.map_err(Error::Body)?;

    Ok(PaginatedResult { items, pagination })
  }

  #[instrument(name = "api.get_members", skip_all, fields(page = params.page_number))]
  pub async fn get_members(&self, params: &UserParams) -> Result<PaginatedResult<Member>> {
    self.get_paginated("users", &params.to_query()).await
  }

  #[instrument(name = "api.get_likes", skip_all, fields(predicate = params.predicate.as_str()))]
  pub async fn get_likes(&self, params: &LikesParams) -> Result<PaginatedResult<Member>> {
    self.get_paginated("likes", &params.to_query()).await
  }

  #[instrument(name = "api.get_member", skip(self))]
  pub async fn get_member(&self, username: &str) -> Result<Member> {
    let url = self.url(&["users", username])?;
    let response = self.send(self.request(Method::GET, url)).await?;
    response.json().await.map_err(Error::Body)
  }

  #[instrument(name = "api.update_member", skip_all, fields(username = %member.username))]
  pub async fn update_member(&self, member: &Member) -> Result<()> {
    self.send_json(Method::PUT, &["users"], member).await
  }

  #[instrument(name = "api.set_main_photo", skip(self))]
  pub async fn set_main_photo(&self, photo_id: u64) -> Result<()> {
    let id = photo_id.to_string();
    self
      .send_json(
        Method::PUT,
        &["users", "set-main-photo", id.as_str()],
        &serde_json::json!({}),
      )
      .await
  }

  #[instrument(name = "api.delete_photo", skip(self))]
  pub async fn delete_photo(&self, photo_id: u64) -> Result<()> {
    let id = photo_id.to_string();
    let url = self.url(&["users", "delete-photo", id.as_str()])?;
    self.send(self.request(Method::DELETE, url)).await?;
    Ok(())
  }

  #[instrument(name = "api.add_like", skip(self))]
  pub async fn add_like(&self, username: &str) -> Result<()> {
    self
      .send_json(Method::POST, &["likes", username], &serde_json::json!({}))
      .await
  }

  async fn send_json<B: Serialize + ?Sized>(
    &self,
    method: Method,
    segments: &[&str],
    body: &B,
  ) -> Result<()> {
    let url = self.url(segments)?;
    self.send(self.request(method, url).json(body)).await?;
    Ok(())
  }
}
