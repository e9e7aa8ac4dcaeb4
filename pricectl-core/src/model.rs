//! Price rows and import summaries

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// One row of the `prices` table.
///
/// `id` is assigned by storage, so rows parsed from an upload carry `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRecord {
    pub id: Option<i64>,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub created_at: NaiveDate,
}

impl PriceRecord {
    /// Build a row that has not been stored yet.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
        created_at: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            category: category.into(),
            price,
            created_at,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// Totals returned after an import.
///
/// `total_items` counts rows inserted by this import only; the other two
/// fields are aggregates over the whole table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total_items: u64,
    pub total_categories: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}
