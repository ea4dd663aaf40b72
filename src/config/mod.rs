use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub mod duration_serde;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Outbound fetch behavior for candidate probing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Timeout applied to every individual outbound request
    #[serde(with = "duration_serde::duration", default = "default_request_timeout")]
    pub request_timeout: Duration,
    /// Overall deadline for one resolution attempt across all candidates
    #[serde(with = "duration_serde::duration", default = "default_resolve_timeout")]
    pub resolve_timeout: Duration,
    /// User-Agent header presented to remote origins
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Upper bound on bytes read from an origin root page
    #[serde(default = "default_max_html_size")]
    pub max_html_size: usize,
    /// Upper bound on bytes read from a candidate image
    #[serde(default = "default_max_image_size")]
    pub max_image_size: usize,
}

/// Cache persistence behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a cached icon stays fresh. Set to "never" for entries that
    /// never expire.
    #[serde(with = "duration_serde::option_duration", default = "default_ttl")]
    pub ttl: Option<Duration>,
    /// Interval between expired-row sweeps (only used when `ttl` is set)
    #[serde(with = "duration_serde::duration", default = "default_cleanup_interval")]
    pub cleanup_interval: Duration,
    /// Icons larger than this edge length are downscaled to exactly this size
    #[serde(default = "default_target_icon_size")]
    pub target_icon_size: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(1)
}

fn default_resolve_timeout() -> Duration {
    Duration::from_millis(1500)
}

fn default_user_agent() -> String {
    "FaviconBot/1.0".to_string()
}

fn default_max_html_size() -> usize {
    512 * 1024
}

fn default_max_image_size() -> usize {
    1024 * 1024
}

fn default_ttl() -> Option<Duration> {
    Some(Duration::from_secs(86400))
}

fn default_cleanup_interval() -> Duration {
    Duration::from_secs(3600)
}

fn default_target_icon_size() -> u32 {
    16
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://./data/favicon-proxy.db".to_string(),
                max_connections: Some(10),
            },
            web: WebConfig {
                host: default_host(),
                port: default_port(),
            },
            fetch: FetchConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            resolve_timeout: default_resolve_timeout(),
            user_agent: default_user_agent(),
            max_html_size: default_max_html_size(),
            max_image_size: default_max_image_size(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            cleanup_interval: default_cleanup_interval(),
            target_icon_size: default_target_icon_size(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }

    /// Reject configurations the service cannot run with.
    ///
    /// Called once at startup so bad values fail immediately instead of
    /// surfacing as odd request-time behavior.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.request_timeout.is_zero() {
            anyhow::bail!("fetch.request_timeout must be greater than zero");
        }
        if self.fetch.resolve_timeout.is_zero() {
            anyhow::bail!("fetch.resolve_timeout must be greater than zero");
        }
        if self.fetch.request_timeout >= self.fetch.resolve_timeout {
            anyhow::bail!(
                "fetch.request_timeout ({}) must be shorter than fetch.resolve_timeout ({})",
                humantime::format_duration(self.fetch.request_timeout),
                humantime::format_duration(self.fetch.resolve_timeout),
            );
        }
        if self.fetch.max_html_size == 0 || self.fetch.max_image_size == 0 {
            anyhow::bail!("fetch.max_html_size and fetch.max_image_size must be greater than zero");
        }
        if self.cache.target_icon_size == 0 {
            anyhow::bail!("cache.target_icon_size must be greater than zero");
        }
        if let Some(ttl) = self.cache.ttl {
            if ttl.is_zero() {
                anyhow::bail!("cache.ttl must be greater than zero when set");
            }
            if self.cache.cleanup_interval.is_zero() {
                anyhow::bail!("cache.cleanup_interval must be greater than zero when cache.ttl is set");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fetch.request_timeout, Duration::from_secs(1));
        assert_eq!(config.fetch.resolve_timeout, Duration::from_millis(1500));
        assert_eq!(config.cache.ttl, Some(Duration::from_secs(86400)));
    }

    #[test]
    fn request_timeout_must_be_shorter_than_deadline() {
        let mut config = Config::default();
        config.fetch.request_timeout = Duration::from_secs(2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_target_icon_size_is_rejected() {
        let mut config = Config::default();
        config.cache.target_icon_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn permanent_cache_needs_no_cleanup_interval() {
        let mut config = Config::default();
        config.cache.ttl = None;
        config.cache.cleanup_interval = Duration::ZERO;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.fetch.resolve_timeout, config.fetch.resolve_timeout);
        assert_eq!(parsed.cache.ttl, config.cache.ttl);
        assert_eq!(parsed.database.url, config.database.url);
    }
}
