//! Pagination metadata and the wire codec for paged collection queries.
//!
//! Paging facts travel out-of-band: the page payload is the response body,
//! while `currentPage`, `itemsPerPage`, `totalItems` and `totalPages` arrive
//! as a JSON object inside the `Pagination` response header.

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Response header carrying the JSON-encoded [`Pagination`] record.
pub const PAGINATION_HEADER: &str = "Pagination";

/// Server-computed paging facts for one page of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Pagination {
  pub current_page: u32,
  pub items_per_page: u32,
  pub total_items: u32,
  pub total_pages: u32,
}

impl Pagination {
  /// Check the numeric relationships the server guarantees.
  fn validate(self) -> Result<Self> {
    if self.items_per_page == 0 {
      return Err(Error::MalformedPagination(
        "itemsPerPage must be at least 1".to_string(),
      ));
    }
    let expected = self.total_items.div_ceil(self.items_per_page);
    if self.total_pages != expected {
      return Err(Error::MalformedPagination(format!(
        "totalPages is {} but {} items at {} per page make {}",
        self.total_pages, self.total_items, self.items_per_page, expected
      )));
    }
    Ok(self)
  }

  pub fn has_next(&self) -> bool {
    self.current_page < self.total_pages
  }
}

/// One page of items paired with its pagination metadata.
///
/// `pagination` is `None` when the server omitted the header.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedResult<T> {
  pub items: Vec<T>,
  pub pagination: Option<Pagination>,
}

/// Build the wire-level query pairs for a paged request.
///
/// Paging comes first, then `filters` in the order given.
pub fn encode_query(
  page_number: u32,
  page_size: u32,
  filters: Vec<(&'static str, String)>,
) -> Vec<(&'static str, String)> {
  let mut params = Vec::with_capacity(filters.len() + 2);
  params.push(("pageNumber", page_number.to_string()));
  params.push(("pageSize", page_size.to_string()));
  params.extend(filters);
  params
}

/// Decode the pagination header, if the server sent one.
///
/// A missing header is `Ok(None)`. A header that is present but not a valid
/// pagination object is an error.
pub fn decode_header(raw: Option<&HeaderValue>) -> Result<Option<Pagination>> {
  let Some(raw) = raw else {
    return Ok(None);
  };

  let text = raw
    .to_str()
    .map_err(|e| Error::MalformedPagination(format!("header is not visible ASCII: {}", e)))?;

  let pagination: Pagination =
    serde_json::from_str(text).map_err(|e| Error::MalformedPagination(e.to_string()))?;

  pagination.validate().map(Some)
}
