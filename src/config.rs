//! Catalog and server configuration.
//!
//! Configuration is read from an optional TOML file, then overridden by
//! `BOOK_CATALOG_*` environment variables. Every field has a default, so an
//! empty file (or none at all) is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

pub const ENV_DATA_FILE: &str = "BOOK_CATALOG_DATA_FILE";
pub const ENV_BIND: &str = "BOOK_CATALOG_BIND";
pub const ENV_PORT: &str = "BOOK_CATALOG_PORT";

/// How ids are assigned to newly created books.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdStrategy {
    /// `len + 1`. Ids can repeat after a deletion.
    #[default]
    Count,
    /// `max(id) + 1`. Never collides with a live id.
    NextMax,
}

/// Which stored books an ISBN conflicts with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// A stored plain book conflicts with every candidate; stored fiction and
    /// non-fiction books only conflict with candidates of their own type.
    #[default]
    Asymmetric,
    /// Every stored book only conflicts with candidates of its own type.
    PerSubtype,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `bind:port` string suitable for `TcpListener::bind`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Top-level configuration, persisted as TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON file holding the collection.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default)]
    pub id_strategy: IdStrategy,
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
    /// Surface write failures to callers instead of only logging them.
    #[serde(default)]
    pub strict_writes: bool,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("books.json")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            id_strategy: IdStrategy::default(),
            duplicate_policy: DuplicatePolicy::default(),
            strict_writes: false,
            server: ServerConfig::default(),
        }
    }
}

impl CatalogConfig {
    /// Config with defaults except for the data file.
    pub fn with_data_file(path: impl Into<PathBuf>) -> Self {
        Self {
            data_file: path.into(),
            ..Default::default()
        }
    }

    /// Parse a TOML config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load from `path` when given, otherwise start from defaults, then
    /// apply environment overrides.
    pub fn resolve(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Apply `BOOK_CATALOG_*` overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(file) = lookup(ENV_DATA_FILE) {
            self.data_file = PathBuf::from(file);
        }
        if let Some(bind) = lookup(ENV_BIND) {
            self.server.bind = bind;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_PORT.into(),
                value: port.clone(),
            })?;
        }
        Ok(())
    }
}
