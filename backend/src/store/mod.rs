//! Persistence for the three ledger collections
//!
//! Every backend speaks the same small contract: list a whole collection in
//! insertion order, and insert one record. Admin operations (replace, clear)
//! and a health ping round it out.

pub mod local;
pub mod postgres;
pub mod rest;
pub mod retry;

use std::sync::Arc;

use async_trait::async_trait;
use shared::{records_of, Collection, LedgerRecord, LedgerSnapshot, Record};
use thiserror::Error;

use crate::config::{Config, StorageBackend};
use crate::error::{AppError, AppResult};

pub use local::{BlobStore, FileBlobStore, LocalStore, MemoryBlobStore};
pub use postgres::PostgresStore;
pub use rest::RestStore;
pub use retry::{RetryPolicy, RetryingStore};

/// Errors raised by a persistence backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{operation} timed out after {timeout_ms} ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store rejected the request: {0}")]
    Rejected(String),

    #[error("Malformed {collection} data: {source}")]
    Serialization {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Inserted {collection} record {id} was not returned by the store")]
    ReadYourWrites { collection: Collection, id: String },
}

impl StoreError {
    /// Whether repeating the same call may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Timeout { .. } | StoreError::Unavailable(_) => true,
            StoreError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::WouldBlock
            ),
            StoreError::Database(e) => matches!(
                e,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::Tls(_)
            ),
            StoreError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().map(|s| s.is_server_error()).unwrap_or(false)
            }
            StoreError::Rejected(_)
            | StoreError::Serialization { .. }
            | StoreError::ReadYourWrites { .. } => false,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage for the preorder, purchase and sale collections.
///
/// `list_all` returns records in insertion order. `insert` is idempotent by
/// record id: inserting an id that already exists leaves the collection
/// unchanged.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Short backend name used in logs and the health endpoint
    fn backend(&self) -> &'static str;

    async fn list_all(&self, collection: Collection) -> StoreResult<Vec<Record>>;

    async fn insert(&self, record: &Record) -> StoreResult<()>;

    /// Replace a whole collection, keeping the given order
    async fn replace_all(&self, collection: Collection, records: &[Record]) -> StoreResult<()>;

    async fn clear(&self, collection: Collection) -> StoreResult<()> {
        self.replace_all(collection, &[]).await
    }

    async fn ping(&self) -> StoreResult<()>;
}

/// List one collection as its concrete record type
pub async fn list<T: LedgerRecord>(store: &dyn LedgerStore) -> StoreResult<Vec<T>> {
    let records = store.list_all(T::COLLECTION).await?;
    Ok(records_of(records))
}

/// Read all three collections
pub async fn load_snapshot(store: &dyn LedgerStore) -> StoreResult<LedgerSnapshot> {
    Ok(LedgerSnapshot {
        preorders: list(store).await?,
        purchases: list(store).await?,
        sales: list(store).await?,
    })
}

/// Reject records that do not belong to `collection`
pub(crate) fn ensure_collection(collection: Collection, records: &[Record]) -> StoreResult<()> {
    match records.iter().find(|r| r.collection() != collection) {
        Some(stray) => Err(StoreError::Rejected(format!(
            "record {} belongs to {}, not {}",
            stray.id(),
            stray.collection(),
            collection
        ))),
        None => Ok(()),
    }
}

/// Settings the chosen backend cannot start without
fn check_storage_config(config: &Config) -> AppResult<()> {
    config
        .storage
        .tables
        .validate()
        .map_err(AppError::Configuration)?;

    match config.storage.backend {
        StorageBackend::Postgres if config.database.url.trim().is_empty() => Err(
            AppError::Configuration("database.url is required for the postgres backend".to_string()),
        ),
        StorageBackend::Rest if config.rest.base_url.trim().is_empty() => Err(
            AppError::Configuration("rest.base_url is required for the rest backend".to_string()),
        ),
        StorageBackend::Rest if config.rest.api_key.trim().is_empty() => Err(
            AppError::Configuration("rest.api_key is required for the rest backend".to_string()),
        ),
        _ => Ok(()),
    }
}

/// Build the configured backend, wrapped in timeout and retry handling
pub async fn build_store(config: &Config) -> AppResult<Arc<dyn LedgerStore>> {
    check_storage_config(config)?;
    let tables = config.storage.tables.clone();

    let inner: Arc<dyn LedgerStore> = match config.storage.backend {
        StorageBackend::Local => Arc::new(LocalStore::new(
            FileBlobStore::new(&config.storage.data_dir),
            tables,
        )),
        StorageBackend::Memory => Arc::new(LocalStore::new(MemoryBlobStore::default(), tables)),
        StorageBackend::Postgres => {
            let store = PostgresStore::connect(&config.database, tables).await?;
            store.ensure_schema().await?;
            Arc::new(store)
        }
        StorageBackend::Rest => Arc::new(RestStore::new(&config.rest, tables)?),
    };

    tracing::info!(backend = inner.backend(), "Persistence backend ready");

    Ok(Arc::new(RetryingStore::new(
        inner,
        RetryPolicy::from(&config.persistence),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        DatabaseConfig, PersistenceConfig, RestConfig, ServerConfig, StorageConfig, TableNames,
    };
    use chrono::NaiveDate;
    use shared::Preorder;

    fn config(backend: StorageBackend) -> Config {
        Config {
            environment: "test".to_string(),
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
            },
            storage: StorageConfig {
                backend,
                data_dir: "data".to_string(),
                tables: TableNames::default(),
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 1,
                min_connections: 0,
            },
            rest: RestConfig {
                base_url: String::new(),
                api_key: String::new(),
            },
            persistence: PersistenceConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_build_memory_store() {
        let store = build_store(&config(StorageBackend::Memory)).await.unwrap();
        assert_eq!(store.backend(), "local");
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_backend_settings_are_configuration_errors() {
        let rest = build_store(&config(StorageBackend::Rest)).await;
        assert!(matches!(rest, Err(AppError::Configuration(msg)) if msg.contains("rest.base_url")));

        let mut keyless = config(StorageBackend::Rest);
        keyless.rest.base_url = "https://example.supabase.co".to_string();
        let rest = build_store(&keyless).await;
        assert!(matches!(rest, Err(AppError::Configuration(msg)) if msg.contains("rest.api_key")));

        let postgres = build_store(&config(StorageBackend::Postgres)).await;
        assert!(matches!(postgres, Err(AppError::Configuration(msg)) if msg.contains("database.url")));
    }

    #[tokio::test]
    async fn test_invalid_table_names_are_configuration_errors() {
        let mut bad = config(StorageBackend::Memory);
        bad.storage.tables.sales = "sales; drop table preorders".to_string();

        let result = build_store(&bad).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::Timeout {
            operation: "insert".into(),
            timeout_ms: 10
        }
        .is_transient());
        assert!(StoreError::Unavailable("down".into()).is_transient());
        assert!(!StoreError::Rejected("bad".into()).is_transient());
        assert!(!StoreError::ReadYourWrites {
            collection: Collection::Sales,
            id: "x".into()
        }
        .is_transient());
        assert!(StoreError::Io(std::io::ErrorKind::TimedOut.into()).is_transient());
        assert!(!StoreError::Io(std::io::ErrorKind::PermissionDenied.into()).is_transient());
    }

    #[test]
    fn test_ensure_collection() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let records = vec![Record::from(Preorder::new(date, "Budi", 10))];
        assert!(ensure_collection(Collection::Preorders, &records).is_ok());
        assert!(matches!(
            ensure_collection(Collection::Sales, &records),
            Err(StoreError::Rejected(_))
        ));
    }
}
