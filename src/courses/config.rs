//! Course API server configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;

/// Default listen address of the course API
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:4000";

/// Default request body limit in bytes
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Configuration for the course API server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Enable permissive CORS
    pub enable_cors: bool,

    /// Enable request logging
    pub enable_request_logging: bool,

    /// Load the demo records into the store at startup
    pub seed_demo_data: bool,

    /// Maximum accepted request body size
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 4000)),
            enable_cors: true,
            enable_request_logging: true,
            seed_demo_data: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Create a new config builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_body_bytes".to_string(),
                reason: "Must accept at least 1 byte".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    bind_address: Option<SocketAddr>,
    enable_cors: Option<bool>,
    enable_request_logging: Option<bool>,
    seed_demo_data: Option<bool>,
    max_body_bytes: Option<usize>,
}

impl ServerConfigBuilder {
    /// Set bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = Some(addr);
        self
    }

    /// Set bind address from string
    pub fn bind_address_str(mut self, addr: &str) -> Result<Self, ConfigError> {
        self.bind_address = Some(addr.parse().map_err(|_| ConfigError::InvalidValue {
            field: "bind_address".to_string(),
            reason: format!("Invalid address: {addr}"),
        })?);
        Ok(self)
    }

    /// Enable/disable CORS
    pub fn enable_cors(mut self, enable: bool) -> Self {
        self.enable_cors = Some(enable);
        self
    }

    /// Enable/disable request logging
    pub fn enable_request_logging(mut self, enable: bool) -> Self {
        self.enable_request_logging = Some(enable);
        self
    }

    /// Enable/disable the demo records
    pub fn seed_demo_data(mut self, enable: bool) -> Self {
        self.seed_demo_data = Some(enable);
        self
    }

    /// Set the request body limit
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = Some(bytes);
        self
    }

    /// Build the config
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let defaults = ServerConfig::default();
        let config = ServerConfig {
            bind_address: self.bind_address.unwrap_or(defaults.bind_address),
            enable_cors: self.enable_cors.unwrap_or(defaults.enable_cors),
            enable_request_logging: self
                .enable_request_logging
                .unwrap_or(defaults.enable_request_logging),
            seed_demo_data: self.seed_demo_data.unwrap_or(defaults.seed_demo_data),
            max_body_bytes: self.max_body_bytes.unwrap_or(defaults.max_body_bytes),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
