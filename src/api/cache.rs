//! Caching implementations for API types.

use crate::cache::{Cacheable, QueryKey};

use super::params::UserParams;
use super::types::Member;

const KEY_DELIMITER: &str = "-";

impl Cacheable for Member {
  fn identity(&self) -> &str {
    &self.username
  }

  fn entity_type() -> &'static str {
    "member"
  }
}

/// Join a collection name and its declared field values into a cache key.
fn build_key(collection: &str, values: &[String]) -> String {
  format!("{}:{}", collection, values.join(KEY_DELIMITER))
}

impl QueryKey for UserParams {
  fn cache_key(&self) -> String {
    // Field order here is the key layout: pageNumber, pageSize, minAge, maxAge, gender, orderBy
    build_key(
      "users",
      &[
        self.page_number.to_string(),
        self.page_size.to_string(),
        self.min_age.to_string(),
        self.max_age.to_string(),
        self.gender.as_str().to_string(),
        self.order_by.as_str().to_string(),
      ],
    )
  }

  fn description(&self) -> String {
    format!(
      "members page {} ({} per page, {} aged {}-{}, by {})",
      self.page_number, self.page_size, self.gender, self.min_age, self.max_age, self.order_by
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::params::{Gender, OrderBy};

  fn params() -> UserParams {
    UserParams {
      page_number: 1,
      page_size: 10,
      min_age: 18,
      max_age: 30,
      gender: Gender::Female,
      order_by: OrderBy::LastActive,
    }
  }

  #[test]
  fn test_key_layout() {
    assert_eq!(params().cache_key(), "users:1-10-18-30-female-lastActive");
  }

  #[test]
  fn test_equal_params_share_key() {
    // Built field by field in a different order
    let mut other = UserParams::for_user(&crate::api::params::CurrentUser {
      username: "bob".to_string(),
      gender: Gender::Male,
    });
    other.order_by = OrderBy::LastActive;
    other.max_age = 30;
    other.page_size = 10;
    other.min_age = 18;

    assert_eq!(other, params());
    assert_eq!(other.cache_key(), params().cache_key());
  }

  #[test]
  fn test_any_field_change_changes_key() {
    let base = params();
    let variants = [
      UserParams {
        page_number: 2,
        ..base.clone()
      },
      UserParams {
        page_size: 5,
        ..base.clone()
      },
      UserParams {
        min_age: 19,
        ..base.clone()
      },
      UserParams {
        max_age: 31,
        ..base.clone()
      },
      UserParams {
        gender: Gender::Male,
        ..base.clone()
      },
      UserParams {
        order_by: OrderBy::Created,
        ..base.clone()
      },
    ];

    for variant in &variants {
      assert_ne!(variant.cache_key(), base.cache_key(), "{:?}", variant);
    }
  }

  #[test]
  fn test_ages_do_not_collide_with_page_fields() {
    let a = UserParams {
      page_number: 11,
      page_size: 1,
      ..params()
    };
    let b = UserParams {
      page_number: 1,
      page_size: 11,
      ..params()
    };
    assert_ne!(a.cache_key(), b.cache_key());
  }
}
