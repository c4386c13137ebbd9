//! Configuration management for the poultry ledger server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with LEDGER__ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::Collection;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Which backend holds the three collections
    pub storage: StorageConfig,

    /// PostgreSQL configuration, used by the `postgres` backend
    pub database: DatabaseConfig,

    /// Hosted REST table API, used by the `rest` backend
    pub rest: RestConfig,

    /// Timeout and retry around every persistence round trip
    pub persistence: PersistenceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// Persistence backend selector
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// JSON blob per collection in `data_dir`
    Local,
    /// JSON blobs held in process memory (lost on restart)
    Memory,
    Postgres,
    Rest,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Postgres => write!(f, "postgres"),
            StorageBackend::Rest => write!(f, "rest"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Directory holding the local JSON blobs
    pub data_dir: String,

    /// Collection (table) names
    pub tables: TableNames,
}

/// Per-collection table or blob names.
///
/// Deployments may suffix these (e.g. `preorders_2026_01_09`) to evolve a
/// schema without migrating in place.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub preorders: String,
    pub purchases: String,
    pub sales: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            preorders: "preorders".to_string(),
            purchases: "purchases".to_string(),
            sales: "sales".to_string(),
        }
    }
}

impl TableNames {
    pub fn name(&self, collection: Collection) -> &str {
        match collection {
            Collection::Preorders => &self.preorders,
            Collection::Purchases => &self.purchases,
            Collection::Sales => &self.sales,
        }
    }

    /// Names end up inside SQL statements and URLs, so only
    /// `[a-z0-9_]`, not starting with a digit, is accepted.
    pub fn validate(&self) -> Result<(), String> {
        for collection in Collection::ALL {
            let name = self.name(collection);
            let valid = !name.is_empty()
                && name.len() <= 63
                && !name.starts_with(|c: char| c.is_ascii_digit())
                && name
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
            if !valid {
                return Err(format!("invalid table name for {}: {:?}", collection, name));
            }
        }

        if self.preorders == self.purchases
            || self.preorders == self.sales
            || self.purchases == self.sales
        {
            return Err("table names must be distinct".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RestConfig {
    /// Project URL; tables live under `{base_url}/rest/v1/`
    pub base_url: String,

    /// API key sent as `apikey` and bearer token
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PersistenceConfig {
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,

    /// Attempts per operation, including the first
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds
    pub initial_backoff_ms: u64,

    /// Upper bound for the retry delay in milliseconds
    pub max_backoff_ms: u64,
}

impl PersistenceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            max_attempts: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 2_000,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("LEDGER_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("storage.backend", "local")?
            .set_default("storage.data_dir", "data")?
            .set_default("storage.tables.preorders", "preorders")?
            .set_default("storage.tables.purchases", "purchases")?
            .set_default("storage.tables.sales", "sales")?
            .set_default("database.url", "postgres://localhost/poultry_ledger")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("rest.base_url", "")?
            .set_default("rest.api_key", "")?
            .set_default("persistence.timeout_ms", 5_000)?
            .set_default("persistence.max_attempts", 3)?
            .set_default("persistence.initial_backoff_ms", 100)?
            .set_default("persistence.max_backoff_ms", 2_000)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (LEDGER__ prefix)
            .add_source(
                Environment::with_prefix("LEDGER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.storage.tables.validate().map_err(ConfigError::Message)?;
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
