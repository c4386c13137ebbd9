//! In-memory copy of all three collections

use serde::{Deserialize, Serialize};

use super::{Collection, LedgerRecord, Preorder, Purchase, Record, Sale};

/// All three collections, each in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub preorders: Vec<Preorder>,
    #[serde(default)]
    pub purchases: Vec<Purchase>,
    #[serde(default)]
    pub sales: Vec<Sale>,
}

impl LedgerSnapshot {
    /// Records of one collection wrapped as [`Record`]s
    pub fn records(&self, collection: Collection) -> Vec<Record> {
        match collection {
            Collection::Preorders => self.preorders.iter().cloned().map(Record::from).collect(),
            Collection::Purchases => self.purchases.iter().cloned().map(Record::from).collect(),
            Collection::Sales => self.sales.iter().cloned().map(Record::from).collect(),
        }
    }

    pub fn counts(&self) -> RecordCounts {
        RecordCounts {
            preorders: self.preorders.len(),
            purchases: self.purchases.len(),
            sales: self.sales.len(),
        }
    }
}

/// Number of records per collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub preorders: usize,
    pub purchases: usize,
    pub sales: usize,
}

impl RecordCounts {
    pub fn total(&self) -> usize {
        self.preorders + self.purchases + self.sales
    }
}

/// Split a list of mixed records into the records of type `T`.
///
/// Records of other collections are dropped.
pub fn records_of<T: LedgerRecord>(records: impl IntoIterator<Item = Record>) -> Vec<T> {
    records.into_iter().filter_map(T::from_record).collect()
}
