use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "optistock.toml";

const MAX_CACHE_TTL_MINUTES: i64 = 7 * 24 * 60;
const MAX_REFRESH_INTERVAL_MINUTES: u64 = 24 * 60;
const MAX_LOADING_FAILSAFE_SECS: u64 = 60 * 60;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 10 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Sheet web endpoint. Empty means "cache only".
    pub api_url: String,
    pub cache_key: String,
    pub cache_ttl_minutes: i64,
    pub refresh_interval_minutes: u64,
    pub loading_failsafe_secs: u64,
    pub request_timeout_secs: u64,
    pub bind_addr: String,
    pub database_path: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            cache_key: "stock_bsas_cache_v1".to_string(),
            cache_ttl_minutes: 30,
            refresh_interval_minutes: 5,
            loading_failsafe_secs: 12,
            request_timeout_secs: 30,
            bind_addr: "127.0.0.1:8080".to_string(),
            database_path: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ViewerConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given (it must exist), else `optistock.toml` in the
    /// working directory if present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_CACHE_TTL_MINUTES).contains(&self.cache_ttl_minutes) {
            return Err(ConfigError::Invalid(format!(
                "cache_ttl_minutes must be between 1 and {MAX_CACHE_TTL_MINUTES}"
            )));
        }
        if !(1..=MAX_REFRESH_INTERVAL_MINUTES).contains(&self.refresh_interval_minutes) {
            return Err(ConfigError::Invalid(format!(
                "refresh_interval_minutes must be between 1 and {MAX_REFRESH_INTERVAL_MINUTES}"
            )));
        }
        if !(1..=MAX_LOADING_FAILSAFE_SECS).contains(&self.loading_failsafe_secs) {
            return Err(ConfigError::Invalid(format!(
                "loading_failsafe_secs must be between 1 and {MAX_LOADING_FAILSAFE_SECS}"
            )));
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ConfigError::Invalid(format!(
                "request_timeout_secs must be between 1 and {MAX_REQUEST_TIMEOUT_SECS}"
            )));
        }
        if self.cache_key.trim().is_empty() {
            return Err(ConfigError::Invalid("cache_key must not be empty".into()));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cache_ttl_minutes)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_minutes * 60)
    }

    pub fn loading_failsafe(&self) -> Duration {
        Duration::from_secs(self.loading_failsafe_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configured database file, or `cache.db` under the platform data dir.
    pub fn resolve_database_path(&self) -> Option<PathBuf> {
        if let Some(p) = &self.database_path {
            return Some(p.clone());
        }
        directories::ProjectDirs::from("ar", "optica-bsas", "optistock")
            .map(|dirs| dirs.data_dir().join("cache.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ViewerConfig::default();
        assert_eq!(c.cache_ttl_minutes, 30);
        assert_eq!(c.refresh_interval(), Duration::from_secs(300));
        assert_eq!(c.loading_failsafe(), Duration::from_secs(12));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ViewerConfig::from_toml(
            r#"
            api_url = "https://example.test/exec"
            cache_ttl_minutes = 15
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(c.api_url, "https://example.test/exec");
        assert_eq!(c.cache_ttl(), chrono::Duration::minutes(15));
        assert_eq!(c.log_format, LogFormat::Json);
        assert_eq!(c.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn rejects_non_positive_ttl() {
        assert!(matches!(
            ViewerConfig::from_toml("cache_ttl_minutes = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_durations() {
        for content in [
            "cache_ttl_minutes = 9223372036854775807",
            "refresh_interval_minutes = 9223372036854775807",
            "loading_failsafe_secs = 86400",
            "request_timeout_secs = 0",
        ] {
            assert!(
                matches!(ViewerConfig::from_toml(content), Err(ConfigError::Invalid(_))),
                "{content}"
            );
        }
        assert!(ViewerConfig::from_toml("cache_ttl_minutes = 10080").is_ok());
        assert!(ViewerConfig::from_toml("refresh_interval_minutes = 1440").is_ok());
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(matches!(
            ViewerConfig::from_toml("cache_ttl_minutes = \"mucho\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            ViewerConfig::load(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.toml");
        std::fs::write(&path, "refresh_interval_minutes = 1\n").unwrap();
        let c = ViewerConfig::load(Some(&path)).unwrap();
        assert_eq!(c.refresh_interval(), Duration::from_secs(60));
    }

    #[test]
    fn api_url_override() {
        let c = ViewerConfig::default().with_api_url(Some("https://x.test".into()));
        assert_eq!(c.api_url, "https://x.test");
        let c = c.with_api_url(None);
        assert_eq!(c.api_url, "https://x.test");
    }

    #[test]
    fn explicit_database_path_wins() {
        let c = ViewerConfig {
            database_path: Some(PathBuf::from("/tmp/stock.db")),
            ..ViewerConfig::default()
        };
        assert_eq!(c.resolve_database_path(), Some(PathBuf::from("/tmp/stock.db")));
    }
}
