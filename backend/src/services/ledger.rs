//! Ledger service: record creation, daily ledger and reports
//!
//! Owns the in-memory snapshot of all three collections. Every read goes
//! through the store first so the snapshot never lags behind it; a failed
//! operation leaves the snapshot untouched.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    available_customers, format_rupiah, parse_entry_date, records_of, validate_date_range,
    validate_import, Collection, DailyLedger, DateRange, LedgerRecord, LedgerSnapshot, Preorder,
    PreorderForm, PricePreviewForm, Purchase, PurchaseForm, RangeReport, Record, RecordCounts,
    Sale, SaleForm, ValidationErrors,
};
use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::store::{self, LedgerStore, StoreError};

/// Source of the current calendar day
pub type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Result of a successful create: the stored record and its reloaded collection
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome<T> {
    pub record: T,
    pub collection: Vec<T>,
}

/// Everything the data entry screen shows for one day
#[derive(Debug, Clone, Serialize)]
pub struct DayEntries {
    #[serde(flatten)]
    pub ledger: DailyLedger,
    pub available_customers: Vec<String>,
    /// Sales can only be entered once someone has preordered for the day
    pub sale_entry_open: bool,
}

/// Derived total shown while a purchase or sale is being typed
#[derive(Debug, Clone, Serialize)]
pub struct PricePreview {
    #[serde(with = "shared::decimal_json")]
    pub total_price: Decimal,
    pub formatted: String,
}

/// Ledger service
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    snapshot: RwLock<LedgerSnapshot>,
    today: Today,
}

impl LedgerService {
    /// Create a service using the local calendar day
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self::with_today(store, Arc::new(|| chrono::Local::now().date_naive()))
    }

    pub fn with_today(store: Arc<dyn LedgerStore>, today: Today) -> Self {
        Self {
            store,
            snapshot: RwLock::new(LedgerSnapshot::default()),
            today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    /// Parse an optional `YYYY-MM-DD` date, defaulting to today
    pub fn resolve_date(&self, value: Option<&str>) -> AppResult<NaiveDate> {
        Ok(parse_entry_date(value, self.today()).map_err(ValidationErrors::from)?)
    }

    // ========================================================================
    // Snapshot
    // ========================================================================

    /// Reload all three collections from the store
    pub async fn refresh(&self) -> AppResult<LedgerSnapshot> {
        let fresh = store::load_snapshot(self.store.as_ref()).await?;
        *self.snapshot.write().await = fresh.clone();
        Ok(fresh)
    }

    /// Last loaded snapshot, without touching the store
    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.snapshot.read().await.clone()
    }

    async fn apply(&self, collection: Collection, records: Vec<Record>) {
        let mut snapshot = self.snapshot.write().await;
        match collection {
            Collection::Preorders => snapshot.preorders = records_of(records),
            Collection::Purchases => snapshot.purchases = records_of(records),
            Collection::Sales => snapshot.sales = records_of(records),
        }
    }

    /// Read one collection through the store and refresh it in the snapshot
    async fn reload<T: LedgerRecord>(&self) -> AppResult<Vec<T>> {
        let records = self.store.list_all(T::COLLECTION).await?;
        self.apply(T::COLLECTION, records.clone()).await;
        Ok(records_of(records))
    }

    pub async fn preorders(&self) -> AppResult<Vec<Preorder>> {
        self.reload().await
    }

    pub async fn purchases(&self) -> AppResult<Vec<Purchase>> {
        self.reload().await
    }

    pub async fn sales(&self) -> AppResult<Vec<Sale>> {
        self.reload().await
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Insert, reload, and confirm the stored copy equals what was written
    async fn commit<T>(&self, record: T) -> AppResult<CommandOutcome<T>>
    where
        T: LedgerRecord + PartialEq,
    {
        let collection = T::COLLECTION;
        self.store.insert(&record.clone().into_record()).await?;

        let records = self.store.list_all(collection).await?;
        let reloaded: Vec<T> = records_of(records.clone());
        if !reloaded.contains(&record) {
            return Err(StoreError::ReadYourWrites {
                collection,
                id: record.id().to_string(),
            }
            .into());
        }
        self.apply(collection, records).await;

        tracing::info!(
            "Recorded {} {} ({} total)",
            collection,
            record.id(),
            reloaded.len()
        );

        Ok(CommandOutcome {
            record,
            collection: reloaded,
        })
    }

    pub async fn create_preorder(&self, form: &PreorderForm) -> AppResult<CommandOutcome<Preorder>> {
        let preorder = form.validate(self.today())?;
        self.commit(preorder).await
    }

    pub async fn create_purchase(&self, form: &PurchaseForm) -> AppResult<CommandOutcome<Purchase>> {
        let purchase = form.validate(self.today())?;
        self.commit(purchase).await
    }

    /// Record a sale; the customer must have preordered for the sale date
    pub async fn create_sale(&self, form: &SaleForm) -> AppResult<CommandOutcome<Sale>> {
        let today = self.today();
        let date = form.entry_date(today)?;
        let available = available_customers(&self.preorders().await?, date);

        let sale = form.validate(today, &available)?;
        self.commit(sale).await
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Customer names eligible for a sale on `date`, in preorder order
    pub async fn available_customers(&self, date: NaiveDate) -> AppResult<Vec<String>> {
        Ok(available_customers(&self.preorders().await?, date))
    }

    /// Same-day records and their totals
    pub async fn daily_ledger(&self, date: NaiveDate) -> AppResult<DailyLedger> {
        let snapshot = self.refresh().await?;
        Ok(DailyLedger::for_date(&snapshot, date))
    }

    pub async fn day_entries(&self, date: NaiveDate) -> AppResult<DayEntries> {
        let snapshot = self.refresh().await?;
        let available = available_customers(&snapshot.preorders, date);

        Ok(DayEntries {
            ledger: DailyLedger::for_date(&snapshot, date),
            sale_entry_open: !available.is_empty(),
            available_customers: available,
        })
    }

    pub fn preview_total(&self, form: &PricePreviewForm) -> AppResult<PricePreview> {
        let total_price = form.validate()?;
        Ok(PricePreview {
            total_price,
            formatted: format_rupiah(total_price),
        })
    }

    /// Per-day summaries over an inclusive range
    pub async fn range_report(&self, range: DateRange) -> AppResult<RangeReport> {
        validate_date_range(&range)?;
        let snapshot = self.refresh().await?;
        Ok(RangeReport::build(&snapshot, &range))
    }

    // ========================================================================
    // Admin
    // ========================================================================

    pub async fn counts(&self) -> AppResult<RecordCounts> {
        Ok(self.refresh().await?.counts())
    }

    /// Remove every record from all three collections
    pub async fn clear_all(&self) -> AppResult<RecordCounts> {
        for collection in Collection::ALL {
            self.store.clear(collection).await?;
        }
        tracing::warn!("Cleared all ledger collections");
        self.counts().await
    }

    /// Replace all three collections with an imported snapshot
    pub async fn import(&self, snapshot: LedgerSnapshot) -> AppResult<RecordCounts> {
        validate_import(&snapshot)?;

        for collection in Collection::ALL {
            self.store
                .replace_all(collection, &snapshot.records(collection))
                .await?;
        }
        tracing::info!("Imported {} records", snapshot.counts().total());
        self.counts().await
    }
}
