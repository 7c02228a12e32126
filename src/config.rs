use crate::api::dummyjson::DEFAULT_BASE_URL;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub users: UsersConfig,
    pub posts: PostsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 20,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UsersConfig {
    pub page_size: usize,
    /// Pause before each "load more" reveal on the user list, in milliseconds.
    pub load_more_delay_ms: u64,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            load_more_delay_ms: 1500,
        }
    }
}

impl UsersConfig {
    pub fn load_more_delay(&self) -> Duration {
        Duration::from_millis(self.load_more_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PostsConfig {
    pub page_size: usize,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("userfeed").join("config.toml"))
    }

    /// Load from `path`, or from the default location when `path` is `None`.
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn validate(&self) -> Result<()> {
        if self.users.page_size == 0 {
            bail!("users.page_size must be at least 1");
        }
        if self.posts.page_size == 0 {
            bail!("posts.page_size must be at least 1");
        }
        if self.api.base_url.trim().is_empty() {
            bail!("api.base_url must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://dummyjson.com");
        assert_eq!(config.api.timeout(), Duration::from_secs(20));
        assert_eq!(config.users.page_size, 5);
        assert_eq!(config.users.load_more_delay(), Duration::from_millis(1500));
        assert_eq!(config.posts.page_size, 10);
    }

    #[test]
    fn test_parse_partial_config() {
        let config = Config::parse(
            r#"
            [users]
            load_more_delay_ms = 0

            [posts]
            page_size = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.users.page_size, 5);
        assert_eq!(config.users.load_more_delay_ms, 0);
        assert_eq!(config.posts.page_size, 3);
        assert_eq!(config.api, ApiConfig::default());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config = Config::parse(include_str!("../config.example.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_empty_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://localhost:8080\"\ntimeout_secs = 3"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout_secs, 3);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[posts]\npage_size = 0").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("posts.page_size"));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[users\npage_size = 2").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }
}
