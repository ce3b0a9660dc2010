//! Domain error model.

use thiserror::Error;

/// Result type used across the decision pipeline.
pub type CoreResult<T> = Result<T, CoreError>;

/// Pipeline-level error.
///
/// Keep this focused on deterministic, per-request failures. Most variants
/// degrade rather than abort: an unknown SKU yields a zero forecast, a missing
/// almanac entry contributes no festival impact. Only `InvalidParameter`
/// rejects a request outright.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// The requested SKU has no sales history.
    #[error("unknown SKU: {0}")]
    UnknownSku(String),

    /// Fewer than two months of sales history for a SKU.
    #[error("insufficient history for {sku}: {months} month(s)")]
    InsufficientHistory { sku: String, months: usize },

    /// A caller-supplied parameter failed validation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A festival name/year pair has no entry in the almanac.
    #[error("no almanac entry for {festival} in {year}")]
    CalendarResolutionMissing { festival: String, year: i32 },
}

impl CoreError {
    pub fn unknown_sku(code: impl Into<String>) -> Self {
        Self::UnknownSku(code.into())
    }

    pub fn insufficient_history(sku: impl Into<String>, months: usize) -> Self {
        Self::InsufficientHistory {
            sku: sku.into(),
            months,
        }
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn calendar_missing(festival: impl Into<String>, year: i32) -> Self {
        Self::CalendarResolutionMissing {
            festival: festival.into(),
            year,
        }
    }
}
