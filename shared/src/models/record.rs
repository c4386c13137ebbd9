//! Collection identifiers and the record envelope used by persistence

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Preorder, Purchase, Sale};

/// The three ledger collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Preorders,
    Purchases,
    Sales,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Preorders, Collection::Purchases, Collection::Sales];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Preorders => "preorders",
            Collection::Purchases => "purchases",
            Collection::Sales => "sales",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record of any collection.
///
/// Serializes as the bare inner record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Preorder(Preorder),
    Purchase(Purchase),
    Sale(Sale),
}

impl Record {
    pub fn collection(&self) -> Collection {
        match self {
            Record::Preorder(_) => Collection::Preorders,
            Record::Purchase(_) => Collection::Purchases,
            Record::Sale(_) => Collection::Sales,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::Preorder(r) => &r.id,
            Record::Purchase(r) => &r.id,
            Record::Sale(r) => &r.id,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            Record::Preorder(r) => r.date,
            Record::Purchase(r) => r.date,
            Record::Sale(r) => r.date,
        }
    }
}

/// Anything scoped to a single calendar day
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// A concrete record type belonging to exactly one collection
pub trait LedgerRecord: Dated + Clone + Sized {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    fn into_record(self) -> Record;

    /// Unwrap a record of this type; `None` if it belongs to another collection
    fn from_record(record: Record) -> Option<Self>;
}

macro_rules! impl_ledger_record {
    ($ty:ident, $variant:ident, $collection:expr) => {
        impl Dated for $ty {
            fn date(&self) -> NaiveDate {
                self.date
            }
        }

        impl LedgerRecord for $ty {
            const COLLECTION: Collection = $collection;

            fn id(&self) -> &str {
                &self.id
            }

            fn into_record(self) -> Record {
                Record::$variant(self)
            }

            fn from_record(record: Record) -> Option<Self> {
                match record {
                    Record::$variant(r) => Some(r),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Record {
            fn from(value: $ty) -> Self {
                Record::$variant(value)
            }
        }
    };
}

impl_ledger_record!(Preorder, Preorder, Collection::Preorders);
impl_ledger_record!(Purchase, Purchase, Collection::Purchases);
impl_ledger_record!(Sale, Sale, Collection::Sales);
