//! Immutable dataset snapshot: the arena object every computation reads from.
//!
//! Derived entities (aggregates, profiles, forecasts, plans, alerts) are pure
//! functions of one snapshot plus an `as_of` date. A new upload produces a
//! whole new snapshot with a fresh version; nothing is mutated in place.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::id::SnapshotVersion;
use crate::sku::Sku;

/// One invoice line from the uploaded sales history. Immutable fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Dealer part number, e.g. `HER-SPL-STD-BLK`.
    pub sku_code: String,
    pub sku: Sku,
    pub date: NaiveDate,
    pub quantity: u32,
    pub unit_price: f64,
    pub location: Option<String>,
}

impl SalesRecord {
    pub fn revenue(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

/// One uploaded on-hand stock row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLevel {
    pub sku_code: String,
    pub current_stock: u32,
    pub location: Option<String>,
}

/// Versioned, immutable view of the dealer's data.
///
/// `stock` is `None` when no stock sheet has been uploaded; consumers must
/// then fall back to velocity-based estimates and flag the source as
/// `estimated`, never silently assume zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSnapshot {
    version: SnapshotVersion,
    sales: Vec<SalesRecord>,
    stock: Option<Vec<StockLevel>>,
}

impl DatasetSnapshot {
    /// Build a snapshot from raw uploads. Sales are re-sorted by date
    /// ascending so downstream consumers can rely on the ordering.
    pub fn new(mut sales: Vec<SalesRecord>, stock: Option<Vec<StockLevel>>) -> Self {
        sales.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.sku_code.cmp(&b.sku_code)));
        Self {
            version: SnapshotVersion::new(),
            sales,
            stock,
        }
    }

    /// Empty snapshot (no uploads yet).
    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    pub fn version(&self) -> SnapshotVersion {
        self.version
    }

    /// All sales records, ordered by date ascending.
    pub fn sales(&self) -> &[SalesRecord] {
        &self.sales
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    /// Whether an on-hand stock sheet has been uploaded with this snapshot.
    pub fn has_stock_upload(&self) -> bool {
        self.stock.is_some()
    }

    /// Uploaded on-hand quantity for a SKU code, if a stock sheet exists and
    /// contains the code.
    pub fn stock_on_hand(&self, sku_code: &str) -> Option<u32> {
        self.stock
            .as_ref()?
            .iter()
            .find(|s| s.sku_code == sku_code)
            .map(|s| s.current_stock)
    }

    /// Records for one SKU code, ordered by date ascending.
    pub fn sales_for(&self, sku_code: &str) -> impl Iterator<Item = &SalesRecord> {
        self.sales.iter().filter(move |r| r.sku_code == sku_code)
    }

    /// Distinct SKUs present in the history, keyed by code, in first-seen
    /// (i.e. earliest-sale) order.
    pub fn sku_index(&self) -> Vec<(String, Sku)> {
        let mut seen: HashMap<&str, ()> = HashMap::new();
        let mut index = Vec::new();
        for record in &self.sales {
            if seen.insert(record.sku_code.as_str(), ()).is_none() {
                index.push((record.sku_code.clone(), record.sku.clone()));
            }
        }
        index
    }

    /// Date range covered by the history, `(first, last)`.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.sales.first()?.date;
        let last = self.sales.last()?.date;
        Some((first, last))
    }

    /// Total revenue per day over the span, used for capital rotation math.
    pub fn average_daily_revenue(&self) -> f64 {
        let Some((first, last)) = self.date_span() else {
            return 0.0;
        };
        let span_days = (last - first).num_days().max(0) + 1;
        let total: f64 = self.sales.iter().map(SalesRecord::revenue).sum();
        total / span_days as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(code: &str, date: NaiveDate, qty: u32, price: f64) -> SalesRecord {
        SalesRecord {
            sku_code: code.to_string(),
            sku: Sku::new("Splendor Plus", "Standard", "Black"),
            date,
            quantity: qty,
            unit_price: price,
            location: None,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn sales_are_sorted_by_date_on_construction() {
        let snapshot = DatasetSnapshot::new(
            vec![
                record("A", d(2024, 3, 5), 1, 100.0),
                record("A", d(2024, 1, 2), 2, 100.0),
                record("A", d(2024, 2, 10), 3, 100.0),
            ],
            None,
        );
        let dates: Vec<_> = snapshot.sales().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 2), d(2024, 2, 10), d(2024, 3, 5)]);
    }

    #[test]
    fn stock_lookup_requires_an_upload() {
        let no_upload = DatasetSnapshot::new(vec![record("A", d(2024, 1, 1), 1, 100.0)], None);
        assert!(!no_upload.has_stock_upload());
        assert_eq!(no_upload.stock_on_hand("A"), None);

        let with_upload = DatasetSnapshot::new(
            vec![record("A", d(2024, 1, 1), 1, 100.0)],
            Some(vec![StockLevel {
                sku_code: "A".to_string(),
                current_stock: 12,
                location: None,
            }]),
        );
        assert_eq!(with_upload.stock_on_hand("A"), Some(12));
        // Uploaded sheet that lacks a code still reports absence for that code.
        assert_eq!(with_upload.stock_on_hand("B"), None);
    }

    #[test]
    fn average_daily_revenue_spans_first_to_last_sale() {
        let snapshot = DatasetSnapshot::new(
            vec![
                record("A", d(2024, 1, 1), 2, 50.0),
                record("A", d(2024, 1, 10), 1, 100.0),
            ],
            None,
        );
        // 200 revenue over 10 days inclusive.
        assert!((snapshot.average_daily_revenue() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn replacement_is_a_new_snapshot_with_a_new_version() {
        let a = DatasetSnapshot::new(vec![record("A", d(2024, 1, 1), 1, 100.0)], None);
        let b = DatasetSnapshot::new(vec![record("A", d(2024, 1, 1), 1, 100.0)], None);
        assert_ne!(a.version(), b.version());
    }

    #[test]
    fn snapshot_survives_a_json_round_trip() {
        let snapshot = DatasetSnapshot::new(
            vec![record("A", d(2024, 1, 1), 2, 72_000.0)],
            Some(vec![StockLevel {
                sku_code: "A".to_string(),
                current_stock: 4,
                location: Some("Delhi".to_string()),
            }]),
        );
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: DatasetSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
        assert_eq!(back.version(), snapshot.version());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn sales_order_is_canonical_for_any_input_order(
            offsets in proptest::collection::vec(0i64..3650, 1..40),
        ) {
            let rows: Vec<SalesRecord> = offsets
                .iter()
                .map(|&o| record("A", d(2021, 1, 1) + chrono::Duration::days(o), 1, 100.0))
                .collect();
            let snapshot = DatasetSnapshot::new(rows, None);
            prop_assert!(
                snapshot
                    .sales()
                    .windows(2)
                    .all(|w| (w[0].date, &w[0].sku_code) <= (w[1].date, &w[1].sku_code))
            );
        }
    }
}
