use clap::{Args, Subcommand};
use color_eyre::{eyre::eyre, Result};
use futures::future::try_join_all;

use crate::api::cached_client::CachedMembersClient;
use crate::api::client::ApiClient;
use crate::api::params::{Gender, LikesParams, LikesPredicate, OrderBy, UserParams};
use crate::api::types::{Member, MemberUpdate};
use crate::cache::CacheResult;
use crate::config::Config;
use crate::pagination::{PaginatedResult, Pagination};

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Browse member pages
  Members {
    #[command(flatten)]
    filters: FilterArgs,
    /// Number of consecutive pages to fetch, starting at --page
    #[arg(long, default_value_t = 1)]
    pages: u32,
    /// Start from the query seeded from your profile instead of the configured defaults
    #[arg(long)]
    reset: bool,
  },
  /// Show a single member
  Member {
    username: String,
    /// Fetch this many default pages first so the lookup can use them
    #[arg(long, default_value_t = 0)]
    scan_pages: u32,
  },
  /// List likes
  Likes {
    #[arg(long, value_enum, default_value_t = LikesPredicate::Liked)]
    predicate: LikesPredicate,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    page_size: Option<u32>,
  },
  /// Like a member
  Like { username: String },
  /// Make one of your photos the main photo
  SetMainPhoto { photo_id: u64 },
  /// Delete one of your photos
  DeletePhoto { photo_id: u64 },
  /// Edit your profile
  Update {
    #[arg(long)]
    introduction: Option<String>,
    #[arg(long)]
    looking_for: Option<String>,
    #[arg(long)]
    interests: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    country: Option<String>,
  },
}

/// Per-command overrides of the configured browse query
#[derive(Debug, Args)]
pub struct FilterArgs {
  #[arg(long)]
  page: Option<u32>,
  #[arg(long)]
  page_size: Option<u32>,
  #[arg(long)]
  min_age: Option<u32>,
  #[arg(long)]
  max_age: Option<u32>,
  #[arg(long, value_enum)]
  gender: Option<Gender>,
  #[arg(long, value_enum)]
  order_by: Option<OrderBy>,
}

impl FilterArgs {
  fn apply(&self, mut params: UserParams) -> UserParams {
    if let Some(v) = self.page {
      params.page_number = v.max(1);
    }
    if let Some(v) = self.page_size {
      params.page_size = v.max(1);
    }
    if let Some(v) = self.min_age {
      params.min_age = v;
    }
    if let Some(v) = self.max_age {
      params.max_age = v;
    }
    if let Some(v) = self.gender {
      params.gender = v;
    }
    if let Some(v) = self.order_by {
      params.order_by = v;
    }
    params
  }
}

/// `count` consecutive page numbers starting at `start`.
fn page_range(start: u32, count: u32) -> Result<Vec<u32>> {
  (0..count)
    .map(|offset| {
      start
        .checked_add(offset)
        .ok_or_else(|| eyre!("Page {} + {} is past the last addressable page", start, offset))
    })
    .collect()
}

/// Likes query from CLI flags, falling back to the configured page size.
fn likes_params(
  predicate: LikesPredicate,
  page: u32,
  page_size: Option<u32>,
  default_page_size: u32,
) -> LikesParams {
  let mut params = LikesParams::new(predicate);
  params.page_number = page.max(1);
  params.page_size = page_size.unwrap_or(default_page_size).max(1);
  params
}

/// Main application state
pub struct App {
  members: CachedMembersClient,
  likes_page_size: u32,
}

impl App {
  pub fn new(config: &Config) -> Result<Self> {
    let api = ApiClient::new(config.api.url.clone(), Config::get_api_token())?;
    let members = CachedMembersClient::new(api, config.user.clone(), config.cache.enabled)
      .with_invalidation(config.cache.invalidation)
      .with_default_params(config.default_params());

    Ok(Self {
      members,
      likes_page_size: config.defaults.page_size,
    })
  }

  pub async fn run(&self, command: Command) -> Result<()> {
    match command {
      Command::Members {
        filters,
        pages,
        reset,
      } => {
        if reset {
          self.members.reset_user_params()?;
        }
        self.browse(&filters, pages).await
      }
      Command::Member {
        username,
        scan_pages,
      } => self.show_member(&username, scan_pages).await,
      Command::Likes {
        predicate,
        page,
        page_size,
      } => {
        let params = likes_params(predicate, page, page_size, self.likes_page_size);
        let result = self.members.get_likes(&params).await?;
        print_page(&result, false);
        Ok(())
      }
      Command::Like { username } => {
        self.members.add_like(&username).await?;
        println!("You have liked {}", username);
        Ok(())
      }
      Command::SetMainPhoto { photo_id } => {
        self.remember_me().await?;
        self.members.set_main_photo(photo_id).await?;
        self.print_my_photos()
      }
      Command::DeletePhoto { photo_id } => {
        self.remember_me().await?;
        self.members.delete_photo(photo_id).await?;
        self.print_my_photos()
      }
      Command::Update {
        introduction,
        looking_for,
        interests,
        city,
        country,
      } => {
        let mut me = self.remember_me().await?;
        MemberUpdate {
          introduction,
          looking_for,
          interests,
          city,
          country,
        }
        .apply(&mut me);
        self.members.update_member(&me).await?;
        println!("Profile updated");
        print_member(&me);
        Ok(())
      }
    }
  }

  async fn browse(&self, filters: &FilterArgs, pages: u32) -> Result<()> {
    let base = filters.apply(self.members.user_params()?);
    self.members.set_user_params(base.clone())?;

    let queries: Vec<UserParams> = page_range(base.page_number, pages.max(1))?
      .into_iter()
      .map(|page| base.with_page(page))
      .collect();
    let results = try_join_all(queries.iter().map(|params| self.members.get_members(params))).await?;

    for result in &results {
      print_page(&result.data, result.is_cached());
    }
    Ok(())
  }

  async fn show_member(&self, username: &str, scan_pages: u32) -> Result<()> {
    let base = self.members.user_params()?;
    for page in page_range(base.page_number, scan_pages)? {
      self.members.get_members(&base.with_page(page)).await?;
    }

    let CacheResult {
      data,
      source,
      cached_at,
    } = self.members.get_member(username).await?;
    tracing::debug!(?source, ?cached_at, "resolved member {}", username);
    print_member(&data);
    Ok(())
  }

  /// Fetch the signed-in member and put it on the known members list.
  async fn remember_me(&self) -> Result<Member> {
    let username = self.members.current_user().username.clone();
    let me = self.members.get_member(&username).await?.data;
    self.members.remember(me.clone())?;
    Ok(me)
  }

  fn print_my_photos(&self) -> Result<()> {
    let username = &self.members.current_user().username;
    let known = self.members.known_members()?;
    if let Some(me) = known.iter().find(|m| &m.username == username) {
      for photo in &me.photos {
        println!("{:>6}  {}  {}", photo.id, if photo.is_main { "*" } else { " " }, photo.url);
      }
    }
    Ok(())
  }
}

fn print_page(page: &PaginatedResult<Member>, cached: bool) {
  match page.pagination {
    Some(Pagination {
      current_page,
      total_pages,
      total_items,
      ..
    }) => println!(
      "Page {}/{} ({} members){}",
      current_page,
      total_pages,
      total_items,
      if cached { " [cached]" } else { "" }
    ),
    None => println!("{} members", page.items.len()),
  }
  if let Some(next) = page.pagination.filter(|p| p.has_next()) {
    println!("  (more with --page {})", next.current_page + 1);
  }

  for member in &page.items {
    let last_active = member
      .last_active
      .map(|t| t.format("%Y-%m-%d").to_string())
      .unwrap_or_default();
    println!(
      "  {:<16} {:<16} {:>3}  {:<16} {}",
      member.username, member.known_as, member.age, member.city, last_active
    );
  }
}

fn print_member(member: &Member) {
  println!("{} ({})", member.known_as, member.username);
  println!("  Age: {}  Gender: {}", member.age, member.gender);
  println!("  Location: {}, {}", member.city, member.country);
  if let Some(created) = member.created {
    println!("  Member since: {}", created.format("%Y-%m-%d"));
  }
  if !member.introduction.is_empty() {
    println!("  Introduction: {}", member.introduction);
  }
  if !member.looking_for.is_empty() {
    println!("  Looking for: {}", member.looking_for);
  }
  if !member.interests.is_empty() {
    println!("  Interests: {}", member.interests);
  }
  println!("  Photos: {}", member.photos.len());
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::params::CurrentUser;

  fn base() -> UserParams {
    UserParams::for_user(&CurrentUser {
      username: "lisa".to_string(),
      gender: Gender::Female,
    })
  }

  #[test]
  fn test_filter_args_override_only_given_fields() {
    let args = FilterArgs {
      page: Some(3),
      page_size: None,
      min_age: None,
      max_age: Some(35),
      gender: None,
      order_by: Some(OrderBy::Created),
    };

    let params = args.apply(base());
    assert_eq!(params.page_number, 3);
    assert_eq!(params.page_size, 5);
    assert_eq!(params.max_age, 35);
    assert_eq!(params.gender, Gender::Male);
    assert_eq!(params.order_by, OrderBy::Created);
  }

  #[test]
  fn test_filter_args_clamp_paging() {
    let args = FilterArgs {
      page: Some(0),
      page_size: Some(0),
      min_age: None,
      max_age: None,
      gender: None,
      order_by: None,
    };

    let params = args.apply(base());
    assert_eq!(params.page_number, 1);
    assert_eq!(params.page_size, 1);
  }

  #[test]
  fn test_page_range_consecutive() {
    assert_eq!(page_range(3, 3).unwrap(), vec![3, 4, 5]);
    assert!(page_range(7, 0).unwrap().is_empty());
  }

  #[test]
  fn test_page_range_stops_at_last_page() {
    assert_eq!(page_range(u32::MAX, 1).unwrap(), vec![u32::MAX]);
    assert!(page_range(u32::MAX, 2).is_err());
    assert!(page_range(u32::MAX - 1, 3).is_err());
  }

  #[test]
  fn test_likes_params_use_configured_page_size() {
    let params = likes_params(LikesPredicate::LikedBy, 2, None, 12);
    assert_eq!(params.page_number, 2);
    assert_eq!(params.page_size, 12);
    assert_eq!(params.predicate, LikesPredicate::LikedBy);

    let params = likes_params(LikesPredicate::Liked, 0, Some(0), 12);
    assert_eq!(params.page_number, 1);
    assert_eq!(params.page_size, 1);

    let params = likes_params(LikesPredicate::Liked, 1, Some(3), 12);
    assert_eq!(params.page_size, 3);
  }
}
