//! Query parameters for the paged collections.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pagination::encode_query;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
}

impl Gender {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Male => "male",
      Self::Female => "female",
    }
  }

  pub fn opposite(&self) -> Self {
    match self {
      Self::Male => Self::Female,
      Self::Female => Self::Male,
    }
  }
}

impl fmt::Display for Gender {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum OrderBy {
  #[default]
  #[serde(rename = "lastActive")]
  LastActive,
  #[serde(rename = "created")]
  Created,
}

impl OrderBy {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::LastActive => "lastActive",
      Self::Created => "created",
    }
  }
}

impl fmt::Display for OrderBy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Which side of the like relation to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum LikesPredicate {
  /// Members the current user liked
  #[default]
  Liked,
  /// Members who liked the current user
  LikedBy,
}

impl LikesPredicate {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Liked => "liked",
      Self::LikedBy => "likedBy",
    }
  }
}

/// The signed-in member that default queries are seeded from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrentUser {
  pub username: String,
  pub gender: Gender,
}

pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const DEFAULT_MIN_AGE: u32 = 18;
pub const DEFAULT_MAX_AGE: u32 = 99;

/// Filters, sort order and paging for the `users` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserParams {
  pub page_number: u32,
  pub page_size: u32,
  pub min_age: u32,
  pub max_age: u32,
  pub gender: Gender,
  pub order_by: OrderBy,
}

impl UserParams {
  /// Default browse query for `user`: first page, members of the opposite gender.
  pub fn for_user(user: &CurrentUser) -> Self {
    Self {
      page_number: 1,
      page_size: DEFAULT_PAGE_SIZE,
      min_age: DEFAULT_MIN_AGE,
      max_age: DEFAULT_MAX_AGE,
      gender: user.gender.opposite(),
      order_by: OrderBy::default(),
    }
  }

  /// The same query pointed at another page.
  pub fn with_page(&self, page_number: u32) -> Self {
    Self {
      page_number,
      ..self.clone()
    }
  }

  /// Filter fields in declared order, excluding paging.
  pub fn filters(&self) -> Vec<(&'static str, String)> {
    vec![
      ("minAge", self.min_age.to_string()),
      ("maxAge", self.max_age.to_string()),
      ("gender", self.gender.as_str().to_string()),
      ("orderBy", self.order_by.as_str().to_string()),
    ]
  }

  pub fn to_query(&self) -> Vec<(&'static str, String)> {
    encode_query(self.page_number, self.page_size, self.filters())
  }
}

/// Paging and predicate for the `likes` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikesParams {
  pub predicate: LikesPredicate,
  pub page_number: u32,
  pub page_size: u32,
}

impl LikesParams {
  pub fn new(predicate: LikesPredicate) -> Self {
    Self {
      predicate,
      page_number: 1,
      page_size: DEFAULT_PAGE_SIZE,
    }
  }

  /// Human-readable description for logging
  pub fn description(&self) -> String {
    format!(
      "{} page {} ({} per page)",
      self.predicate.as_str(),
      self.page_number,
      self.page_size
    )
  }

  pub fn to_query(&self) -> Vec<(&'static str, String)> {
    encode_query(
      self.page_number,
      self.page_size,
      vec![("predicate", self.predicate.as_str().to_string())],
    )
  }
}
