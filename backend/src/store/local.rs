//! Local blob persistence: one JSON array per collection
//!
//! Blobs written by the earlier browser client used camelCase field names
//! (`customerName`, `pricePerKg`, `totalPrice`). Those are accepted on read;
//! writes always use the snake_case schema.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use shared::{Collection, Preorder, Purchase, Record, Sale};
use tokio::sync::{Mutex, RwLock};

use super::{ensure_collection, LedgerStore, StoreError, StoreResult};
use crate::config::TableNames;

const LEGACY_KEYS: [(&str, &str); 3] = [
    ("customerName", "customer_name"),
    ("pricePerKg", "price_per_kg"),
    ("totalPrice", "total_price"),
];

/// Keyed text storage
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, value: String) -> StoreResult<()>;

    async fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Blobs kept in process memory
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        self.blobs.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.blobs.write().await.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per blob inside a directory
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match tokio::fs::read_to_string(self.path(key)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        // Readers must never observe a half-written file
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, self.path(key)).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        match tokio::fs::remove_file(self.path(key)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// [`LedgerStore`] over any [`BlobStore`], one blob per collection
pub struct LocalStore<B> {
    blobs: B,
    tables: TableNames,
    write_lock: Mutex<()>,
}

impl<B: BlobStore> LocalStore<B> {
    pub fn new(blobs: B, tables: TableNames) -> Self {
        Self {
            blobs,
            tables,
            write_lock: Mutex::new(()),
        }
    }

    async fn read(&self, collection: Collection) -> StoreResult<Vec<Record>> {
        match self.blobs.get(self.tables.name(collection)).await? {
            Some(blob) if !blob.trim().is_empty() => decode(collection, &blob),
            _ => Ok(Vec::new()),
        }
    }

    async fn write(&self, collection: Collection, records: &[Record]) -> StoreResult<()> {
        let blob = encode(collection, records)?;
        self.blobs.set(self.tables.name(collection), blob).await
    }
}

#[async_trait]
impl<B: BlobStore> LedgerStore for LocalStore<B> {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn list_all(&self, collection: Collection) -> StoreResult<Vec<Record>> {
        self.read(collection).await
    }

    async fn insert(&self, record: &Record) -> StoreResult<()> {
        let collection = record.collection();
        let _guard = self.write_lock.lock().await;

        let mut records = self.read(collection).await?;
        if let Some(existing) = records.iter().find(|r| r.id() == record.id()) {
            if existing == record {
                tracing::debug!(
                    "{} record {} already present, skipping insert",
                    collection,
                    record.id()
                );
                return Ok(());
            }
            return Err(StoreError::Rejected(format!(
                "{} already holds a different record with id {}",
                collection,
                record.id()
            )));
        }

        records.push(record.clone());
        self.write(collection, &records).await
    }

    async fn replace_all(&self, collection: Collection, records: &[Record]) -> StoreResult<()> {
        ensure_collection(collection, records)?;
        let _guard = self.write_lock.lock().await;
        self.write(collection, records).await
    }

    async fn clear(&self, collection: Collection) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.blobs.remove(self.tables.name(collection)).await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.blobs.get(self.tables.name(Collection::Preorders)).await?;
        Ok(())
    }
}

/// Rename camelCase keys to their snake_case form; snake_case wins if both exist
fn normalize_legacy_keys(row: &mut Map<String, Value>) {
    for (legacy, canonical) in LEGACY_KEYS {
        if let Some(value) = row.remove(legacy) {
            row.entry(canonical).or_insert(value);
        }
    }
}

fn decode(collection: Collection, blob: &str) -> StoreResult<Vec<Record>> {
    let to_err = |source: serde_json::Error| StoreError::Serialization { collection, source };

    let rows: Vec<Map<String, Value>> = serde_json::from_str(blob).map_err(to_err)?;
    rows.into_iter()
        .map(|mut row| -> Result<Record, serde_json::Error> {
            normalize_legacy_keys(&mut row);
            let value = Value::Object(row);
            let record: Record = match collection {
                Collection::Preorders => serde_json::from_value::<Preorder>(value)?.into(),
                Collection::Purchases => serde_json::from_value::<Purchase>(value)?.into(),
                Collection::Sales => serde_json::from_value::<Sale>(value)?.into(),
            };
            Ok(record)
        })
        .collect::<Result<Vec<Record>, serde_json::Error>>()
        .map_err(to_err)
}

fn encode(collection: Collection, records: &[Record]) -> StoreResult<String> {
    serde_json::to_string(records).map_err(|source| StoreError::Serialization { collection, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn store() -> LocalStore<MemoryBlobStore> {
        LocalStore::new(MemoryBlobStore::default(), TableNames::default())
    }

    #[tokio::test]
    async fn test_empty_collection_lists_nothing() {
        let records = store().list_all(Collection::Sales).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_insert_then_list_in_order() {
        let store = store();
        let first = Record::from(Preorder::new(date(), "Budi", 10));
        let second = Record::from(Preorder::new(date(), "Sari", 5));
        store.insert(&first).await.unwrap();
        store.insert(&second).await.unwrap();

        let records = store.list_all(Collection::Preorders).await.unwrap();
        assert_eq!(records, vec![first, second]);
    }

    #[tokio::test]
    async fn test_insert_is_idempotent_by_id() {
        let store = store();
        let record = Record::from(Purchase::new(date(), 30, dec("45.0"), dec("28000")).unwrap());
        store.insert(&record).await.unwrap();
        store.insert(&record).await.unwrap();

        assert_eq!(store.list_all(Collection::Purchases).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_conflicting_id_is_rejected() {
        let store = store();
        let original = Preorder::new(date(), "Budi", 10);
        let mut conflicting = original.clone();
        conflicting.quantity = 11;

        store.insert(&original.into()).await.unwrap();
        let result = store.insert(&conflicting.into()).await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_reads_legacy_camel_case_blob() {
        let blobs = MemoryBlobStore::default();
        blobs
            .set(
                "sales",
                r#"[{"id":"1736000000000","customerName":"Budi","quantity":10,
                    "weight":15.5,"pricePerKg":32000,"totalPrice":496000,"date":"2025-01-01"}]"#
                    .to_string(),
            )
            .await
            .unwrap();
        let store = LocalStore::new(blobs, TableNames::default());

        let records = store.list_all(Collection::Sales).await.unwrap();
        match &records[..] {
            [Record::Sale(sale)] => {
                assert_eq!(sale.customer_name, "Budi");
                assert_eq!(sale.price_per_kg, dec("32000"));
                assert_eq!(sale.total_price, dec("496000"));
            }
            other => panic!("unexpected records: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_blob_is_a_serialization_error() {
        let blobs = MemoryBlobStore::default();
        blobs.set("preorders", "{not json".to_string()).await.unwrap();
        let store = LocalStore::new(blobs, TableNames::default());

        let result = store.list_all(Collection::Preorders).await;
        assert!(matches!(result, Err(StoreError::Serialization { .. })));
    }

    #[tokio::test]
    async fn test_replace_all_rejects_foreign_records() {
        let store = store();
        let record = Record::from(Preorder::new(date(), "Budi", 10));
        let result = store.replace_all(Collection::Sales, &[record]).await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_clear_empties_collection() {
        let store = store();
        store
            .insert(&Preorder::new(date(), "Budi", 10).into())
            .await
            .unwrap();
        store.clear(Collection::Preorders).await.unwrap();
        assert!(store.list_all(Collection::Preorders).await.unwrap().is_empty());
    }

    #[test]
    fn test_snake_case_wins_over_legacy_key() {
        let mut row: Map<String, Value> =
            serde_json::from_str(r#"{"customer_name":"Sari","customerName":"Budi"}"#).unwrap();
        normalize_legacy_keys(&mut row);
        assert_eq!(row.get("customer_name"), Some(&Value::from("Sari")));
        assert!(!row.contains_key("customerName"));
    }
}
