use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::api::cached_client::InvalidationPolicy;
use crate::api::params::{
  CurrentUser, UserParams, DEFAULT_MAX_AGE, DEFAULT_MIN_AGE, DEFAULT_PAGE_SIZE,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// The signed-in member; default queries are seeded from it
  pub user: CurrentUser,
  #[serde(default)]
  pub defaults: QueryDefaults,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL, e.g. https://localhost:5001/api/
  pub url: Url,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryDefaults {
  #[serde(default = "default_page_size")]
  pub page_size: u32,
  #[serde(default = "default_min_age")]
  pub min_age: u32,
  #[serde(default = "default_max_age")]
  pub max_age: u32,
}

impl Default for QueryDefaults {
  fn default() -> Self {
    Self {
      page_size: DEFAULT_PAGE_SIZE,
      min_age: DEFAULT_MIN_AGE,
      max_age: DEFAULT_MAX_AGE,
    }
  }
}

fn default_page_size() -> u32 {
  DEFAULT_PAGE_SIZE
}

fn default_min_age() -> u32 {
  DEFAULT_MIN_AGE
}

fn default_max_age() -> u32 {
  DEFAULT_MAX_AGE
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default = "default_true")]
  pub enabled: bool,
  #[serde(default)]
  pub invalidation: InvalidationPolicy,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      invalidation: InvalidationPolicy::default(),
    }
  }
}

fn default_true() -> bool {
  true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
  /// Write logs here instead of stderr
  pub file: Option<PathBuf>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./mbrowse.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/mbrowse/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/mbrowse/config.yaml"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("mbrowse.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("mbrowse").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config = Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    config
      .validate()
      .map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Check values the API requires to be in range.
  fn validate(&self) -> Result<()> {
    if self.defaults.page_size == 0 {
      return Err(eyre!("defaults.page_size must be at least 1"));
    }
    Ok(())
  }

  fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  /// The browse query used when no flags override it.
  pub fn default_params(&self) -> UserParams {
    UserParams {
      page_size: self.defaults.page_size,
      min_age: self.defaults.min_age,
      max_age: self.defaults.max_age,
      ..UserParams::for_user(&self.user)
    }
  }

  /// Get the API bearer token from the environment, if set.
  pub fn get_api_token() -> Option<String> {
    std::env::var("MBROWSE_TOKEN").ok().filter(|t| !t.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::params::Gender;

  #[test]
  fn test_minimal_config() {
    let config = Config::parse(
      "api:\n  url: https://localhost:5001/api/\nuser:\n  username: lisa\n  gender: female\n",
    )
    .unwrap();

    assert_eq!(config.api.url.as_str(), "https://localhost:5001/api/");
    assert_eq!(config.user.gender, Gender::Female);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.invalidation, InvalidationPolicy::Never);
    assert!(config.log.file.is_none());
    assert!(config.validate().is_ok());

    let params = config.default_params();
    assert_eq!(params.page_size, 5);
    assert_eq!(params.gender, Gender::Male);
  }

  #[test]
  fn test_full_config() {
    let config = Config::parse(
      r#"
api:
  url: http://localhost:5000/api/
user:
  username: todd
  gender: male
defaults:
  page_size: 12
  max_age: 40
cache:
  enabled: false
  invalidation: on-mutation
log:
  file: /tmp/mbrowse.log
"#,
    )
    .unwrap();

    assert!(!config.cache.enabled);
    assert_eq!(config.cache.invalidation, InvalidationPolicy::OnMutation);
    assert_eq!(config.log.file, Some(PathBuf::from("/tmp/mbrowse.log")));

    let params = config.default_params();
    assert_eq!(params.page_size, 12);
    assert_eq!(params.min_age, 18);
    assert_eq!(params.max_age, 40);
    assert_eq!(params.gender, Gender::Female);
  }

  #[test]
  fn test_rejects_zero_page_size() {
    let config = Config::parse(
      "api:\n  url: http://x/\nuser:\n  username: a\n  gender: male\ndefaults:\n  page_size: 0\n",
    )
    .unwrap();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_load_rejects_zero_page_size() {
    let path = std::env::temp_dir().join(format!("mbrowse-zero-page-{}.yaml", std::process::id()));
    std::fs::write(
      &path,
      "api:\n  url: http://x/\nuser:\n  username: a\n  gender: male\ndefaults:\n  page_size: 0\n",
    )
    .unwrap();

    let result = Config::load(Some(&path));
    std::fs::remove_file(&path).unwrap();
    assert!(result.is_err());
  }

  #[test]
  fn test_rejects_unknown_gender() {
    assert!(Config::parse("api:\n  url: http://x/\nuser:\n  username: a\n  gender: other\n").is_err());
  }

  #[test]
  fn test_missing_explicit_path() {
    assert!(Config::load(Some(Path::new("/nonexistent/mbrowse.yaml"))).is_err());
  }
}
