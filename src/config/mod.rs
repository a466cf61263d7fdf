//! Configuration loading and validation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::fetch::RiotClientConfig;
use crate::profile::{ProfileSettings, SOLO_QUEUE_ID};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Data provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiotConfig {
    /// Platform host for summoner and league lookups
    #[serde(default = "default_platform_url")]
    pub platform_url: String,

    /// Regional host for match lookups
    #[serde(default = "default_regional_url")]
    pub regional_url: String,

    /// API key; `RIOT_API_KEY` overrides
    #[serde(default)]
    pub api_key: String,

    /// Timeout in seconds
    #[serde(default = "default_riot_timeout")]
    pub timeout_seconds: u64,

    /// Recent matches analyzed per player
    #[serde(default = "default_match_count")]
    pub match_count: u32,

    /// Match-history queue filter
    #[serde(default = "default_solo_queue_id")]
    pub solo_queue_id: u32,
}

fn default_platform_url() -> String {
    "https://kr.api.riotgames.com".to_string()
}

fn default_regional_url() -> String {
    "https://asia.api.riotgames.com".to_string()
}

fn default_riot_timeout() -> u64 {
    10
}

fn default_match_count() -> u32 {
    20
}

fn default_solo_queue_id() -> u32 {
    SOLO_QUEUE_ID
}

impl Default for RiotConfig {
    fn default() -> Self {
        Self {
            platform_url: default_platform_url(),
            regional_url: default_regional_url(),
            api_key: String::new(),
            timeout_seconds: default_riot_timeout(),
            match_count: default_match_count(),
            solo_queue_id: default_solo_queue_id(),
        }
    }
}

impl RiotConfig {
    pub fn client_config(&self) -> Result<RiotClientConfig, ConfigError> {
        Ok(RiotClientConfig {
            platform_url: parse_url("riot.platform_url", &self.platform_url)?,
            regional_url: parse_url("riot.regional_url", &self.regional_url)?,
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
        })
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl")]
    pub profile_ttl_seconds: u64,

    #[serde(default = "default_ttl")]
    pub stats_ttl_seconds: u64,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_ttl() -> u64 {
    3600
}

fn default_max_entries() -> usize {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            profile_ttl_seconds: default_ttl(),
            stats_ttl_seconds: default_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

/// Optimizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// `false` always uses the local partition
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Base URL; `AI_ENGINE_URL` overrides
    #[serde(default = "default_optimizer_url")]
    pub base_url: String,

    /// Deadline in seconds; `AI_ENGINE_TIMEOUT` (milliseconds) overrides
    #[serde(default = "default_optimizer_timeout")]
    pub timeout_seconds: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_optimizer_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_optimizer_timeout() -> u64 {
    30
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: default_optimizer_url(),
            timeout_seconds: default_optimizer_timeout(),
        }
    }
}

impl OptimizerConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn url(&self) -> Result<Url, ConfigError> {
        parse_url("optimizer.base_url", &self.base_url)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub riot: RiotConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub optimizer: OptimizerConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            riot: RiotConfig::default(),
            cache: CacheConfig::default(),
            optimizer: OptimizerConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, defaults otherwise, then apply
    /// environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally the process env).
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(key) = lookup("RIOT_API_KEY") {
            self.riot.api_key = key;
        }

        if let Some(url) = lookup("AI_ENGINE_URL") {
            parse_url("AI_ENGINE_URL", &url)?;
            self.optimizer.base_url = url;
        }

        if let Some(ms) = lookup("AI_ENGINE_TIMEOUT") {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("AI_ENGINE_TIMEOUT is not a number: {}", ms))
            })?;
            self.optimizer.timeout_seconds = ms.div_ceil(1000);
        }

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.riot.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Provider timeout must be greater than 0".to_string(),
            ));
        }

        if self.riot.match_count == 0 || self.riot.match_count > 100 {
            return Err(ConfigError::ValidationError(
                "Match count must be between 1 and 100".to_string(),
            ));
        }

        if self.optimizer.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Optimizer timeout must be greater than 0".to_string(),
            ));
        }

        if self.cache.profile_ttl_seconds == 0 || self.cache.stats_ttl_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Cache TTLs must be greater than 0".to_string(),
            ));
        }

        self.riot.client_config()?;
        self.optimizer.url()?;

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Settings for the profile aggregator.
    pub fn profile_settings(&self) -> ProfileSettings {
        ProfileSettings {
            profile_ttl: Duration::from_secs(self.cache.profile_ttl_seconds),
            stats_ttl: Duration::from_secs(self.cache.stats_ttl_seconds),
            match_count: self.riot.match_count,
            queue: Some(self.riot.solo_queue_id),
        }
    }
}

fn parse_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value)
        .map_err(|e| ConfigError::ValidationError(format!("{} is not a valid URL: {}", field, e)))
}
