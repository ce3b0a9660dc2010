//! `dispatchiq-forecast`: seasonal-trend demand forecasting with festival
//! adjustment.
//!
//! The engine combines a SKU's trailing daily average, its seasonal profile,
//! the festival calendar's demand multiplier and the fitted YoY trend into a
//! dated per-SKU series with confidence bands that widen over the horizon.
//! What-if scenarios re-run the same engine under a perturbed calendar or a
//! scaled base rate and report the delta.

pub mod engine;
pub mod summary;
pub mod whatif;

pub use engine::{
    BASE_CI_WIDTH, CI_WIDTH_SLOPE, ForecastEngine, ForecastPoint, MAX_HORIZON_DAYS, SkuForecast,
    cumulative, peak, peak_festival_boost,
};
pub use summary::{FestivalImpactGrade, ForecastSummary, forecast_summary};
pub use whatif::{FUEL_PRICE_ELASTICITY, Scenario, WHAT_IF_HORIZON_DAYS, WhatIfOutcome, simulate};
