//! Hosted table API persistence
//!
//! Talks to a PostgREST-compatible endpoint (`{base_url}/rest/v1/{table}`),
//! authenticating with the project API key.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{Collection, Preorder, Purchase, Record, Sale};

use super::{ensure_collection, LedgerStore, StoreError, StoreResult};
use crate::config::{RestConfig, TableNames};

const PREORDER_COLUMNS: &str = "id,customer_name,quantity,date";
const PURCHASE_COLUMNS: &str = "id,quantity,weight,price_per_kg,total_price,date";
const SALE_COLUMNS: &str = "id,customer_name,quantity,weight,price_per_kg,total_price,date";

/// Ledger store backed by a hosted REST table API
#[derive(Clone)]
pub struct RestStore {
    base_url: String,
    api_key: String,
    tables: TableNames,
    http_client: Client,
}

impl RestStore {
    pub fn new(config: &RestConfig, tables: TableNames) -> StoreResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(StoreError::Rejected("rest.base_url is not configured".to_string()));
        }

        // Per-call deadlines are enforced by the retry wrapper
        let http_client = Client::builder().build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            tables,
            http_client,
        })
    }

    fn table_url(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.tables.name(collection))
    }

    fn request(&self, method: reqwest::Method, collection: Collection) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, self.table_url(collection))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        collection: Collection,
        columns: &str,
    ) -> StoreResult<Vec<T>> {
        let response = self
            .request(reqwest::Method::GET, collection)
            .query(&[("select", columns), ("order", "created_at.asc,id.asc")])
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    async fn post(&self, collection: Collection, records: &[Record]) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let response = self
            .request(reqwest::Method::POST, collection)
            .query(&[("on_conflict", "id")])
            .header("Prefer", "return=minimal,resolution=ignore-duplicates")
            .json(records)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}

/// Map a non-success status to a store error; 5xx and 429 are retryable
async fn check(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = format!("API returned {}: {}", status, body);

    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Err(StoreError::Unavailable(message))
    } else {
        Err(StoreError::Rejected(message))
    }
}

#[async_trait]
impl LedgerStore for RestStore {
    fn backend(&self) -> &'static str {
        "rest"
    }

    async fn list_all(&self, collection: Collection) -> StoreResult<Vec<Record>> {
        let records = match collection {
            Collection::Preorders => self
                .fetch::<Preorder>(collection, PREORDER_COLUMNS)
                .await?
                .into_iter()
                .map(Record::from)
                .collect(),
            Collection::Purchases => self
                .fetch::<Purchase>(collection, PURCHASE_COLUMNS)
                .await?
                .into_iter()
                .map(Record::from)
                .collect(),
            Collection::Sales => self
                .fetch::<Sale>(collection, SALE_COLUMNS)
                .await?
                .into_iter()
                .map(Record::from)
                .collect(),
        };
        Ok(records)
    }

    async fn insert(&self, record: &Record) -> StoreResult<()> {
        self.post(record.collection(), std::slice::from_ref(record)).await
    }

    /// Not atomic: the table is emptied first, then refilled in one request
    async fn replace_all(&self, collection: Collection, records: &[Record]) -> StoreResult<()> {
        ensure_collection(collection, records)?;
        self.clear(collection).await?;
        self.post(collection, records).await
    }

    async fn clear(&self, collection: Collection) -> StoreResult<()> {
        // Deletes need a filter; this one matches every row
        let response = self
            .request(reqwest::Method::DELETE, collection)
            .query(&[("id", "not.is.null")])
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        let response = self
            .request(reqwest::Method::GET, Collection::Preorders)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> RestConfig {
        RestConfig {
            base_url: base_url.to_string(),
            api_key: "anon-key".to_string(),
        }
    }

    #[test]
    fn test_table_url_uses_configured_names() {
        let tables = TableNames {
            preorders: "preorders_2026_01_09_07_00".to_string(),
            purchases: "purchases_2026_01_09_07_00".to_string(),
            sales: "sales_2026_01_09_07_00".to_string(),
        };
        let store = RestStore::new(&config("https://example.supabase.co/"), tables).unwrap();

        assert_eq!(
            store.table_url(Collection::Sales),
            "https://example.supabase.co/rest/v1/sales_2026_01_09_07_00"
        );
    }

    #[test]
    fn test_missing_base_url_is_rejected() {
        let result = RestStore::new(&config("  "), TableNames::default());
        assert!(matches!(result, Err(StoreError::Rejected(_))));
    }
}
