//! Read-side repositories over the current snapshot.
//!
//! The decision pipeline consumes whole snapshots; these traits exist for
//! callers that want row-level access (upload previews, dashboards) without
//! caring where the data lives.

use std::sync::Arc;

use chrono::NaiveDate;

use dispatchiq_core::SalesRecord;

use crate::snapshot_store::SnapshotStore;

pub trait SalesRepository: Send + Sync {
    /// Sales rows, date ascending, optionally narrowed to one SKU code
    /// and/or an inclusive date range.
    fn query(
        &self,
        sku_code: Option<&str>,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Vec<SalesRecord>;
}

pub trait StockRepository: Send + Sync {
    /// On-hand units for the code. `None` when no stock sheet covers it;
    /// consumers fall back to a velocity estimate.
    fn current_stock(&self, sku_code: &str) -> Option<u32>;
}

/// Both repository views over the live [`SnapshotStore`].
#[derive(Clone)]
pub struct SnapshotRepository {
    store: Arc<SnapshotStore>,
}

impl SnapshotRepository {
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self { store }
    }
}

impl SalesRepository for SnapshotRepository {
    fn query(
        &self,
        sku_code: Option<&str>,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Vec<SalesRecord> {
        let snapshot = self.store.load();
        snapshot
            .sales()
            .iter()
            .filter(|r| sku_code.map_or(true, |code| r.sku_code == code))
            .filter(|r| range.map_or(true, |(from, to)| r.date >= from && r.date <= to))
            .cloned()
            .collect()
    }
}

impl StockRepository for SnapshotRepository {
    fn current_stock(&self, sku_code: &str) -> Option<u32> {
        self.store.load().stock_on_hand(sku_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatchiq_core::{DatasetSnapshot, Sku, StockLevel};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn record(code: &str, date: NaiveDate) -> SalesRecord {
        SalesRecord {
            sku_code: code.to_string(),
            sku: Sku::new("HF Deluxe", "Standard", "Black"),
            date,
            quantity: 1,
            unit_price: 64_000.0,
            location: None,
        }
    }

    fn repo() -> SnapshotRepository {
        let snapshot = DatasetSnapshot::new(
            vec![
                record("HER-HFD-STD-BLK", d(2024, 1, 10)),
                record("HER-HFD-STD-BLK", d(2024, 2, 10)),
                record("HER-HFD-STD-RED", d(2024, 1, 20)),
            ],
            Some(vec![StockLevel {
                sku_code: "HER-HFD-STD-BLK".to_string(),
                current_stock: 7,
                location: None,
            }]),
        );
        SnapshotRepository::new(Arc::new(SnapshotStore::new(snapshot)))
    }

    #[test]
    fn query_filters_by_code_and_range() {
        let repo = repo();
        assert_eq!(repo.query(None, None).len(), 3);
        assert_eq!(repo.query(Some("HER-HFD-STD-BLK"), None).len(), 2);

        let january = repo.query(None, Some((d(2024, 1, 1), d(2024, 1, 31))));
        assert_eq!(january.len(), 2);
        assert!(january.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn stock_lookup_distinguishes_absence() {
        let repo = repo();
        assert_eq!(repo.current_stock("HER-HFD-STD-BLK"), Some(7));
        assert_eq!(repo.current_stock("HER-HFD-STD-RED"), None);
    }
}
