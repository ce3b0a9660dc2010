//! `dispatchiq-analytics`: sales history aggregation.
//!
//! Turns the raw sales snapshot into the per-SKU statistics the forecast and
//! dispatch pipeline runs on (seasonal profiles, trend factors, daily
//! averages) plus the YoY/MoM/performance aggregates the alert rules and the
//! presentation layer consume. Everything here is a deterministic, pure
//! function of one snapshot.

pub mod aggregate;
pub mod performance;
pub mod profile;

pub use aggregate::{MomPoint, MonthlyComparison, mom_monthly, month_name, yoy_monthly};
pub use performance::{
    ColourBreakdown, DashboardSummary, SeasonalPatternRow, SkuPerformance, colour_analysis,
    dashboard_summary, seasonal_patterns, sku_performance,
};
pub use profile::{MonthlyAggregate, SeasonalProfile, SeasonalProfileBuilder, SkuProfile, SkuProfiles};
