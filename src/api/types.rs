use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A member profile as returned by the `users` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
  pub username: String,
  #[serde(default)]
  pub known_as: String,
  #[serde(default)]
  pub age: u32,
  #[serde(default)]
  pub gender: String,
  pub photo_url: Option<String>,
  pub created: Option<DateTime<Utc>>,
  pub last_active: Option<DateTime<Utc>>,
  #[serde(default)]
  pub introduction: String,
  #[serde(default)]
  pub looking_for: String,
  #[serde(default)]
  pub interests: String,
  #[serde(default)]
  pub city: String,
  #[serde(default)]
  pub country: String,
  #[serde(default)]
  pub photos: Vec<Photo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
  pub id: u64,
  pub url: String,
  #[serde(default)]
  pub is_main: bool,
}

impl Member {
  /// Mark `photo_id` as the main photo. Returns false if the member doesn't own it.
  pub fn set_main_photo(&mut self, photo_id: u64) -> bool {
    let Some(url) = self
      .photos
      .iter()
      .find(|p| p.id == photo_id)
      .map(|p| p.url.clone())
    else {
      return false;
    };

    for photo in &mut self.photos {
      photo.is_main = photo.id == photo_id;
    }
    self.photo_url = Some(url);
    true
  }

  /// Remove `photo_id`. Returns false if the member doesn't own it.
  pub fn remove_photo(&mut self, photo_id: u64) -> bool {
    let before = self.photos.len();
    self.photos.retain(|p| p.id != photo_id);
    self.photos.len() != before
  }
}

/// Profile fields a member may edit
#[derive(Debug, Clone, Default)]
pub struct MemberUpdate {
  pub introduction: Option<String>,
  pub looking_for: Option<String>,
  pub interests: Option<String>,
  pub city: Option<String>,
  pub country: Option<String>,
}

impl MemberUpdate {
  pub fn apply(self, member: &mut Member) {
    if let Some(v) = self.introduction {
      member.introduction = v;
    }
    if let Some(v) = self.looking_for {
      member.looking_for = v;
    }
    if let Some(v) = self.interests {
      member.interests = v;
    }
    if let Some(v) = self.city {
      member.city = v;
    }
    if let Some(v) = self.country {
      member.country = v;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn member() -> Member {
    serde_json::from_value(serde_json::json!({
      "username": "ana",
      "knownAs": "Ana",
      "photoUrl": "http://img/1.jpg",
      "lastActive": "2024-03-01T10:00:00Z",
      "photos": [
        {"id": 1, "url": "http://img/1.jpg", "isMain": true},
        {"id": 2, "url": "http://img/2.jpg", "isMain": false}
      ]
    }))
    .unwrap()
  }

  #[test]
  fn test_deserialize_minimal_member() {
    let m: Member = serde_json::from_str(r#"{"username":"ana"}"#).unwrap();
    assert_eq!(m.username, "ana");
    assert!(m.photos.is_empty());
    assert!(m.last_active.is_none());
  }

  #[test]
  fn test_set_main_photo() {
    let mut m = member();
    assert!(m.set_main_photo(2));
    assert_eq!(m.photo_url.as_deref(), Some("http://img/2.jpg"));
    assert!(!m.photos[0].is_main);
    assert!(m.photos[1].is_main);
    assert!(!m.set_main_photo(9));
  }

  #[test]
  fn test_remove_photo() {
    let mut m = member();
    assert!(m.remove_photo(1));
    assert_eq!(m.photos.len(), 1);
    assert!(!m.remove_photo(1));
  }

  #[test]
  fn test_update_only_touches_given_fields() {
    let mut m = member();
    m.city = "Lisbon".to_string();
    MemberUpdate {
      interests: Some("hiking".to_string()),
      ..Default::default()
    }
    .apply(&mut m);
    assert_eq!(m.interests, "hiking");
    assert_eq!(m.city, "Lisbon");
  }
}
