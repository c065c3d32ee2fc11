//! Configuration management for minicourse
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Every value has a default, so no configuration
//! is required to run either program.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::dispatch::DispatchConfig;
use crate::status::DEFAULT_TARGETS;
use crate::utils::retry::RetryConfig;

pub use crate::courses::config::ServerConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Course API server configuration
    pub server: ServerConfig,

    /// Status checker configuration
    pub checker: CheckerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Status checker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Endpoints checked when none are given on the command line
    pub targets: Vec<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum number of checks in flight (unbounded when unset)
    pub max_concurrency: Option<usize>,

    /// Upper bound on one whole check including retries, in seconds
    pub task_timeout_secs: Option<u64>,

    /// Retries for transient transport failures (0 = single attempt)
    pub max_retries: u32,

    /// Base delay for exponential retry backoff in milliseconds
    pub retry_base_delay_ms: u64,

    /// User agent string
    pub user_agent: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            targets: DEFAULT_TARGETS.iter().map(|t| t.to_string()).collect(),
            request_timeout_secs: 30,
            max_concurrency: None,
            task_timeout_secs: None,
            max_retries: 0,
            retry_base_delay_ms: 500,
            user_agent: format!("minicourse/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CheckerConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Dispatcher limits derived from this configuration
    #[must_use]
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            max_concurrency: self.max_concurrency,
            task_timeout: self.task_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Retry policy for a single probe
    #[must_use]
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::with_delays(
            self.max_retries,
            self.retry_base_delay_ms,
            self.request_timeout_secs.saturating_mul(1000),
        )
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("MINICOURSE_BIND_ADDRESS") {
            config.server.bind_address = addr
                .parse()
                .with_context(|| format!("Invalid MINICOURSE_BIND_ADDRESS: {addr}"))?;
        }
        if let Some(cors) = env_parse("MINICOURSE_ENABLE_CORS") {
            config.server.enable_cors = cors;
        }
        if let Some(seed) = env_parse("MINICOURSE_SEED_DEMO_DATA") {
            config.server.seed_demo_data = seed;
        }

        if let Ok(targets) = std::env::var("MINICOURSE_TARGETS") {
            let targets: Vec<String> = targets
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
            if !targets.is_empty() {
                config.checker.targets = targets;
            }
        }
        if let Some(timeout) = env_parse("MINICOURSE_REQUEST_TIMEOUT") {
            config.checker.request_timeout_secs = timeout;
        }
        if let Some(limit) = env_parse("MINICOURSE_MAX_CONCURRENCY") {
            config.checker.max_concurrency = Some(limit);
        }
        if let Some(retries) = env_parse("MINICOURSE_MAX_RETRIES") {
            config.checker.max_retries = retries;
        }

        if let Ok(level) = std::env::var("MINICOURSE_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("MINICOURSE_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.server.validate().context("Invalid server configuration")?;

        self.checker
            .dispatch_config()
            .validate()
            .context("Invalid checker configuration")?;

        if self.checker.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("log format must be 'text' or 'json', got '{}'", self.logging.format);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_address.port(), 4000);
        assert_eq!(config.checker.targets.len(), DEFAULT_TARGETS.len());
    }

    #[test]
    fn test_invalid_concurrency() {
        let mut config = Config::default();
        config.checker.max_concurrency = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_timeout_conversion() {
        let config = CheckerConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_dispatch_config_derivation() {
        let config = CheckerConfig {
            max_concurrency: Some(3),
            task_timeout_secs: Some(10),
            ..Default::default()
        };
        let dispatch = config.dispatch_config();
        assert_eq!(dispatch.max_concurrency, Some(3));
        assert_eq!(dispatch.task_timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [checker]
            targets = ["https://example.com"]
            max_retries = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.checker.targets, vec!["https://example.com"]);
        assert_eq!(config.checker.max_retries, 2);
        assert_eq!(config.checker.request_timeout_secs, 30);
        assert_eq!(config.server, ServerConfig::default());
    }
}
