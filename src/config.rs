//! Adapter configuration
//!
//! Loaded from YAML; every key is optional and falls back to its default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Connection and behaviour settings of a [`CypherAdapter`](crate::CypherAdapter)
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// URI scheme, e.g. `bolt` or `neo4j`
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Database name (None = server default)
    pub database: Option<String>,
    /// Label given to created nodes that name none
    pub default_node_label: String,
    /// Type given to created edges that name none
    pub default_edge_label: String,
    /// Result cap when a caller does not give one
    pub default_limit: i64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            protocol: "bolt".to_string(),
            host: "localhost".to_string(),
            port: 7687,
            username: "neo4j".to_string(),
            password: "123456789".to_string(),
            database: Some("neo4j".to_string()),
            default_node_label: "Thing".to_string(),
            default_edge_label: "RelatedTo".to_string(),
            default_limit: crate::cypher::DEFAULT_LIMIT,
        }
    }
}

impl AdapterConfig {
    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// YAML rendering with the password redacted
    pub fn to_redacted_yaml(&self) -> ConfigResult<String> {
        let mut shown = self.clone();
        shown.password = REDACTED.to_string();
        Ok(serde_yaml::to_string(&shown)?)
    }

    /// `protocol://host:port`
    pub fn connection_uri(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    /// What a session provider needs to open its driver
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            uri: self.connection_uri(),
            database: self.database.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// Endpoint, database and credentials handed to a provider factory
#[derive(Clone, PartialEq)]
pub struct ConnectionSettings {
    pub uri: String,
    /// None = server default
    pub database: Option<String>,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("uri", &self.uri)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &REDACTED)
            .finish()
    }
}

const REDACTED: &str = "********";

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &REDACTED)
            .field("database", &self.database)
            .field("default_node_label", &self.default_node_label)
            .field("default_edge_label", &self.default_edge_label)
            .field("default_limit", &self.default_limit)
            .finish()
    }
}
