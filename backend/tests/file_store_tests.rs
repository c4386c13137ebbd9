//! File-backed local store tests

use std::str::FromStr;

use chrono::NaiveDate;
use ledger_server::config::TableNames;
use ledger_server::store::{FileBlobStore, LedgerStore, LocalStore, StoreError};
use rust_decimal::Decimal;
use shared::{Collection, Preorder, Purchase, Record, Sale};
use tempfile::TempDir;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn open(dir: &TempDir) -> LocalStore<FileBlobStore> {
    LocalStore::new(FileBlobStore::new(dir.path()), TableNames::default())
}

#[tokio::test]
async fn test_missing_files_read_as_empty() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    for collection in Collection::ALL {
        assert!(store.list_all(collection).await.unwrap().is_empty());
    }
    assert!(store.ping().await.is_ok());
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let sale = Sale::new(day("2025-01-01"), "Budi", 10, dec("15.35"), dec("32000")).unwrap();
    let purchase = Purchase::new(day("2025-01-01"), 30, dec("45.0"), dec("28000")).unwrap();

    {
        let store = open(&dir);
        store.insert(&sale.clone().into()).await.unwrap();
        store.insert(&purchase.clone().into()).await.unwrap();
    }

    let store = open(&dir);
    assert_eq!(
        store.list_all(Collection::Sales).await.unwrap(),
        vec![Record::Sale(sale)]
    );
    assert_eq!(
        store.list_all(Collection::Purchases).await.unwrap(),
        vec![Record::Purchase(purchase)]
    );
}

#[tokio::test]
async fn test_blob_is_a_json_array_with_numbers() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let purchase = Purchase::new(day("2025-01-01"), 30, dec("45.0"), dec("28000")).unwrap();
    store.insert(&purchase.into()).await.unwrap();

    let text = std::fs::read_to_string(dir.path().join("purchases.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let row = &json.as_array().unwrap()[0];

    assert!(row["weight"].is_number());
    assert_eq!(row["total_price"].as_f64(), Some(1_260_000.0));
    assert_eq!(row["date"], "2025-01-01");
}

#[tokio::test]
async fn test_reads_blob_written_by_browser_client() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("preorders.json"),
        r#"[{"id":"1736121600000","customerName":"Budi","quantity":10,"date":"2025-01-01"},
            {"id":"1736121600001","customerName":"Sari","quantity":5,"date":"2025-01-02"}]"#,
    )
    .unwrap();

    let store = open(&dir);
    let records = store.list_all(Collection::Preorders).await.unwrap();
    let names: Vec<&str> = records
        .iter()
        .map(|r| match r {
            Record::Preorder(p) => p.customer_name.as_str(),
            other => panic!("unexpected record {:?}", other),
        })
        .collect();
    assert_eq!(names, vec!["Budi", "Sari"]);

    // Rewritten in the snake_case schema on the next insert
    store
        .insert(&Preorder::new(day("2025-01-03"), "Wati", 2).into())
        .await
        .unwrap();
    let text = std::fs::read_to_string(dir.path().join("preorders.json")).unwrap();
    assert!(text.contains("customer_name"));
    assert!(!text.contains("customerName"));
}

#[tokio::test]
async fn test_repeated_reads_are_identical() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    for name in ["Budi", "Sari", "Wati"] {
        store
            .insert(&Preorder::new(day("2025-01-01"), name, 3).into())
            .await
            .unwrap();
    }

    let first = store.list_all(Collection::Preorders).await.unwrap();
    let second = store.list_all(Collection::Preorders).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[tokio::test]
async fn test_uses_configured_table_names() {
    let dir = TempDir::new().unwrap();
    let tables = TableNames {
        preorders: "preorders_2026_01_09_07_00".to_string(),
        purchases: "purchases_2026_01_09_07_00".to_string(),
        sales: "sales_2026_01_09_07_00".to_string(),
    };
    let store = LocalStore::new(FileBlobStore::new(dir.path()), tables);
    store
        .insert(&Preorder::new(day("2025-01-01"), "Budi", 10).into())
        .await
        .unwrap();

    assert!(dir.path().join("preorders_2026_01_09_07_00.json").exists());
    assert!(!dir.path().join("preorders.json").exists());
}

#[tokio::test]
async fn test_corrupt_file_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("sales.json"), "[{\"id\": 1").unwrap();

    let result = open(&dir).list_all(Collection::Sales).await;
    assert!(matches!(
        result,
        Err(StoreError::Serialization {
            collection: Collection::Sales,
            ..
        })
    ));
}

#[tokio::test]
async fn test_concurrent_inserts_are_all_kept() {
    let dir = TempDir::new().unwrap();
    let store = std::sync::Arc::new(open(&dir));

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let preorder = Preorder::new(day("2025-01-01"), format!("Pelanggan {}", i), 1);
                store.insert(&preorder.into()).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.list_all(Collection::Preorders).await.unwrap().len(), 10);
}
