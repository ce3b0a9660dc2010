//! `dispatchiq-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! SKU identity, the immutable sales/stock snapshot every computation reads
//! from, and the error taxonomy shared by the decision pipeline.

pub mod error;
pub mod id;
pub mod sku;
pub mod snapshot;

pub use error::{CoreError, CoreResult};
pub use id::SnapshotVersion;
pub use sku::Sku;
pub use snapshot::{DatasetSnapshot, SalesRecord, StockLevel};
