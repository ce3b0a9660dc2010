//! Atomic snapshot handoff between uploads and in-flight computations.

use std::sync::{Arc, RwLock};

use dispatchiq_core::{DatasetSnapshot, SnapshotVersion};

/// Holds the current [`DatasetSnapshot`] behind an `RwLock<Arc<..>>`.
///
/// Readers clone the `Arc` and compute against that snapshot for as long as
/// they need; an upload swaps the whole `Arc` in one write. A computation
/// started before the swap keeps its old snapshot; one started after sees the
/// new one. No reader ever observes a half-replaced dataset.
#[derive(Debug)]
pub struct SnapshotStore {
    inner: RwLock<Arc<DatasetSnapshot>>,
}

impl SnapshotStore {
    pub fn new(snapshot: DatasetSnapshot) -> Self {
        Self {
            inner: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The current snapshot. Cheap; clones only the `Arc`.
    pub fn load(&self) -> Arc<DatasetSnapshot> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Swap in a freshly built snapshot, returning its version.
    pub fn replace(&self, snapshot: DatasetSnapshot) -> SnapshotVersion {
        let version = snapshot.version();
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let old = guard.version();
        *guard = Arc::new(snapshot);
        drop(guard);
        tracing::info!(%old, new = %version, "snapshot replaced");
        version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatchiq_core::{SalesRecord, Sku};
    use chrono::NaiveDate;

    fn one_record_snapshot(qty: u32) -> DatasetSnapshot {
        DatasetSnapshot::new(
            vec![SalesRecord {
                sku_code: "HER-SPL-STD-BLK".to_string(),
                sku: Sku::new("Splendor Plus", "Standard", "Black"),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                quantity: qty,
                unit_price: 72_000.0,
                location: None,
            }],
            None,
        )
    }

    #[test]
    fn replace_swaps_the_whole_snapshot() {
        let store = SnapshotStore::new(one_record_snapshot(1));
        let before = store.load();

        let new_version = store.replace(one_record_snapshot(9));
        let after = store.load();

        assert_ne!(before.version(), after.version());
        assert_eq!(after.version(), new_version);
        // The pre-swap handle still reads the old data.
        assert_eq!(before.sales()[0].quantity, 1);
        assert_eq!(after.sales()[0].quantity, 9);
    }

    #[test]
    fn concurrent_readers_see_one_version_or_the_other() {
        let store = Arc::new(SnapshotStore::new(one_record_snapshot(1)));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..200 {
                    let snap = store.load();
                    // quantity and version always belong to the same upload
                    let qty = snap.sales()[0].quantity;
                    assert!(qty == 1 || qty == 9);
                    assert_eq!(snap.sales()[0].quantity, qty);
                }
            }));
        }
        for _ in 0..50 {
            store.replace(one_record_snapshot(9));
            store.replace(one_record_snapshot(1));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
