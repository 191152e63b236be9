//! Error taxonomy shared by the cache and API layers.

use reqwest::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// Connection failure, timeout, or any other failure before a response arrived
  #[error("request failed: {0}")]
  Transport(#[source] reqwest::Error),

  #[error("{url} returned HTTP {status}")]
  Status { status: StatusCode, url: String },

  /// Response body did not match the expected entity shape
  #[error("failed to decode response body: {0}")]
  Body(#[source] reqwest::Error),

  /// The pagination header was present but unusable
  #[error("malformed pagination header: {0}")]
  MalformedPagination(String),

  #[error("invalid base URL: {0}")]
  InvalidBaseUrl(String),

  #[error("state lock poisoned")]
  LockPoisoned,
}

impl Error {
  /// Classify a reqwest error that happened while sending a request.
  pub fn from_send(err: reqwest::Error) -> Self {
    match err.status() {
      Some(status) => Self::Status {
        status,
        url: err.url().map(|u| u.to_string()).unwrap_or_default(),
      },
      None => Self::Transport(err),
    }
  }
}
