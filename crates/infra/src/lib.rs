//! `dispatchiq-infra`: snapshot storage, repositories, demo data and the
//! pipeline facade that wires the decision crates together.

pub mod pipeline;
pub mod repository;
pub mod sample_data;
pub mod snapshot_store;

pub use pipeline::{DEFAULT_LEAD_TIME_DAYS, DecisionEngine};
pub use repository::{SalesRepository, SnapshotRepository, StockRepository};
pub use sample_data::{sample_sales, sample_snapshot};
pub use snapshot_store::SnapshotStore;
