//! Console Gateway Configuration
//!
//! Configuration is resolved in three layers:
//! 1. Built-in defaults
//! 2. An optional TOML file
//! 3. Environment overrides
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CG_CONFIG` | - | Path to a TOML config file |
//! | `CG_HTTP_ADDR` | `0.0.0.0:7351` | HTTP console surface bind address |
//! | `CG_GRPC_ADDR` | `0.0.0.0:7348` | gRPC console surface bind address |
//! | `CG_RPC_NAMESPACE` | `admin.` | Namespace prefixed to HTTP RPC ids |
//! | `CG_LOG_LEVEL` | `info` | Default log filter |
//! | `CG_LOG_JSON` | `false` | Emit JSON log lines |

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration for {field}: {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level console gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConsoleConfig {
    pub server: ServerConfig,
    pub rpc: RpcConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub http_addr: String,
    pub grpc_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:7351".to_string(),
            grpc_addr: "0.0.0.0:7348".to_string(),
        }
    }
}

/// Settings that shape how RPC requests are normalised before dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RpcConfig {
    /// Prefix applied to identifiers arriving on the HTTP surface.
    pub http_namespace: String,
    /// Two-character prefix the gRPC gateway puts on forwarded query params.
    pub grpc_metadata_prefix: String,
    /// Metadata keys that are never exposed to registered functions.
    pub reserved_keys: Vec<String>,
    /// Presence of this key selects raw payload handling.
    pub unwrap_key: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            http_namespace: "admin.".to_string(),
            grpc_metadata_prefix: "q_".to_string(),
            reserved_keys: vec!["http_key".to_string()],
            unwrap_key: "unwrap".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading config file");
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `CG_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CG_HTTP_ADDR") {
            self.server.http_addr = v;
        }
        if let Some(v) = lookup("CG_GRPC_ADDR") {
            self.server.grpc_addr = v;
        }
        if let Some(v) = lookup("CG_RPC_NAMESPACE") {
            self.rpc.http_namespace = v;
        }
        if let Some(v) = lookup("CG_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("CG_LOG_JSON") {
            self.logging.json = v == "true" || v == "1";
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.http_addr()?;
        self.grpc_addr()?;

        let namespace = &self.rpc.http_namespace;
        if namespace.is_empty() {
            return Err(ConfigError::invalid("rpc.http_namespace", "must not be empty"));
        }
        if namespace.to_lowercase() != *namespace {
            return Err(ConfigError::invalid("rpc.http_namespace", "must be lowercase"));
        }
        if self.rpc.grpc_metadata_prefix.chars().count() != 2 {
            return Err(ConfigError::invalid(
                "rpc.grpc_metadata_prefix",
                "must be exactly two characters",
            ));
        }
        if self.rpc.unwrap_key.is_empty() {
            return Err(ConfigError::invalid("rpc.unwrap_key", "must not be empty"));
        }
        Ok(())
    }

    pub fn http_addr(&self) -> Result<SocketAddr> {
        parse_addr("server.http_addr", &self.server.http_addr)
    }

    pub fn grpc_addr(&self) -> Result<SocketAddr> {
        parse_addr("server.grpc_addr", &self.server.grpc_addr)
    }
}

fn parse_addr(field: &str, value: &str) -> Result<SocketAddr> {
    value
        .parse()
        .map_err(|_| ConfigError::invalid(field, format!("'{}' is not a socket address", value)))
}
