//! PostgreSQL persistence, one table per collection

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::{Collection, Preorder, Purchase, Record, Sale};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use super::{ensure_collection, LedgerStore, StoreError, StoreResult};
use crate::config::{DatabaseConfig, TableNames};
use async_trait::async_trait;

/// Ledger store backed by PostgreSQL
#[derive(Clone)]
pub struct PostgresStore {
    db: PgPool,
    tables: TableNames,
}

#[derive(Debug, sqlx::FromRow)]
struct PreorderRow {
    id: String,
    customer_name: String,
    quantity: i64,
    date: NaiveDate,
}

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: String,
    quantity: i64,
    weight: Decimal,
    price_per_kg: Decimal,
    total_price: Decimal,
    date: NaiveDate,
}

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    customer_name: String,
    quantity: i64,
    weight: Decimal,
    price_per_kg: Decimal,
    total_price: Decimal,
    date: NaiveDate,
}

fn quantity(id: &str, value: i64) -> StoreResult<u32> {
    u32::try_from(value)
        .map_err(|_| StoreError::Rejected(format!("record {} has quantity {} out of range", id, value)))
}

impl TryFrom<PreorderRow> for Preorder {
    type Error = StoreError;

    fn try_from(row: PreorderRow) -> StoreResult<Self> {
        Ok(Preorder {
            quantity: quantity(&row.id, row.quantity)?,
            id: row.id,
            customer_name: row.customer_name,
            date: row.date,
        })
    }
}

impl TryFrom<PurchaseRow> for Purchase {
    type Error = StoreError;

    fn try_from(row: PurchaseRow) -> StoreResult<Self> {
        Ok(Purchase {
            quantity: quantity(&row.id, row.quantity)?,
            id: row.id,
            weight: row.weight,
            price_per_kg: row.price_per_kg,
            total_price: row.total_price,
            date: row.date,
        })
    }
}

impl TryFrom<SaleRow> for Sale {
    type Error = StoreError;

    fn try_from(row: SaleRow) -> StoreResult<Self> {
        Ok(Sale {
            quantity: quantity(&row.id, row.quantity)?,
            id: row.id,
            customer_name: row.customer_name,
            weight: row.weight,
            price_per_kg: row.price_per_kg,
            total_price: row.total_price,
            date: row.date,
        })
    }
}

impl PostgresStore {
    pub fn new(db: PgPool, tables: TableNames) -> Self {
        Self { db, tables }
    }

    pub async fn connect(config: &DatabaseConfig, tables: TableNames) -> StoreResult<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.url)
            .await?;

        tracing::info!("Database connection established");
        Ok(Self::new(db, tables))
    }

    /// Create any missing collection table
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for collection in Collection::ALL {
            let table = self.tables.name(collection);
            let columns = match collection {
                Collection::Preorders => {
                    "customer_name TEXT NOT NULL,
                     quantity BIGINT NOT NULL CHECK (quantity > 0),"
                }
                Collection::Purchases => {
                    "quantity BIGINT NOT NULL CHECK (quantity > 0),
                     weight NUMERIC NOT NULL CHECK (weight > 0),
                     price_per_kg NUMERIC NOT NULL CHECK (price_per_kg > 0),
                     total_price NUMERIC NOT NULL,"
                }
                Collection::Sales => {
                    "customer_name TEXT NOT NULL,
                     quantity BIGINT NOT NULL CHECK (quantity > 0),
                     weight NUMERIC NOT NULL CHECK (weight > 0),
                     price_per_kg NUMERIC NOT NULL CHECK (price_per_kg > 0),
                     total_price NUMERIC NOT NULL,"
                }
            };

            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    seq BIGSERIAL NOT NULL,
                    id TEXT PRIMARY KEY,
                    {columns}
                    date DATE NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )"
            );
            sqlx::query(&ddl).execute(&self.db).await?;

            let index = format!("CREATE INDEX IF NOT EXISTS idx_{table}_date ON {table} (date)");
            sqlx::query(&index).execute(&self.db).await?;
        }

        tracing::info!("Ledger tables ready");
        Ok(())
    }
}

/// Insert one record, ignoring an id that already exists. Returns rows written.
async fn insert_record<'e, E>(executor: E, table: &str, record: &Record) -> Result<u64, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = match record {
        Record::Preorder(r) => {
            sqlx::query(&format!(
                "INSERT INTO {table} (id, customer_name, quantity, date)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (id) DO NOTHING"
            ))
            .bind(&r.id)
            .bind(&r.customer_name)
            .bind(i64::from(r.quantity))
            .bind(r.date)
            .execute(executor)
            .await?
        }
        Record::Purchase(r) => {
            sqlx::query(&format!(
                "INSERT INTO {table} (id, quantity, weight, price_per_kg, total_price, date)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 ON CONFLICT (id) DO NOTHING"
            ))
            .bind(&r.id)
            .bind(i64::from(r.quantity))
            .bind(r.weight)
            .bind(r.price_per_kg)
            .bind(r.total_price)
            .bind(r.date)
            .execute(executor)
            .await?
        }
        Record::Sale(r) => {
            sqlx::query(&format!(
                "INSERT INTO {table} (id, customer_name, quantity, weight, price_per_kg, total_price, date)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (id) DO NOTHING"
            ))
            .bind(&r.id)
            .bind(&r.customer_name)
            .bind(i64::from(r.quantity))
            .bind(r.weight)
            .bind(r.price_per_kg)
            .bind(r.total_price)
            .bind(r.date)
            .execute(executor)
            .await?
        }
    };

    Ok(result.rows_affected())
}

#[async_trait]
impl LedgerStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list_all(&self, collection: Collection) -> StoreResult<Vec<Record>> {
        let table = self.tables.name(collection);

        let records = match collection {
            Collection::Preorders => sqlx::query_as::<_, PreorderRow>(&format!(
                "SELECT id, customer_name, quantity, date FROM {table} ORDER BY seq"
            ))
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(|row| Preorder::try_from(row).map(Record::from))
            .collect::<StoreResult<Vec<_>>>()?,
            Collection::Purchases => sqlx::query_as::<_, PurchaseRow>(&format!(
                "SELECT id, quantity, weight, price_per_kg, total_price, date
                 FROM {table} ORDER BY seq"
            ))
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(|row| Purchase::try_from(row).map(Record::from))
            .collect::<StoreResult<Vec<_>>>()?,
            Collection::Sales => sqlx::query_as::<_, SaleRow>(&format!(
                "SELECT id, customer_name, quantity, weight, price_per_kg, total_price, date
                 FROM {table} ORDER BY seq"
            ))
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(|row| Sale::try_from(row).map(Record::from))
            .collect::<StoreResult<Vec<_>>>()?,
        };

        Ok(records)
    }

    async fn insert(&self, record: &Record) -> StoreResult<()> {
        let table = self.tables.name(record.collection());
        let written = insert_record(&self.db, table, record).await?;
        if written == 0 {
            tracing::debug!("{} record {} already present", record.collection(), record.id());
        }
        Ok(())
    }

    async fn replace_all(&self, collection: Collection, records: &[Record]) -> StoreResult<()> {
        ensure_collection(collection, records)?;
        let table = self.tables.name(collection);

        let mut tx = self.db.begin().await?;
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
        for record in records {
            insert_record(&mut *tx, table, record).await?;
        }
        tx.commit().await?;

        tracing::info!("Replaced {} with {} records", collection, records.len());
        Ok(())
    }

    async fn clear(&self, collection: Collection) -> StoreResult<()> {
        let table = self.tables.name(collection);
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
