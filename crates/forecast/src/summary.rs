//! Per-SKU horizon totals for the dispatch overview.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use dispatchiq_core::{CoreResult, Sku};

use crate::engine::{ForecastEngine, cumulative, peak, peak_festival_boost};

/// How hard the festival calendar hits a SKU's horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FestivalImpactGrade {
    High,
    Medium,
    Low,
}

impl FestivalImpactGrade {
    /// Graded off the peak multiplier seen in the horizon.
    pub fn from_peak_boost(boost: f64) -> Self {
        if boost > 1.3 {
            Self::High
        } else if boost > 1.1 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// 30/60-day totals and the peak day for one SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub code: String,
    pub sku: Sku,
    pub total_30d: f64,
    pub total_60d: f64,
    pub peak_day: Option<NaiveDate>,
    pub festival_impact: FestivalImpactGrade,
}

/// Summarise a 60-day horizon for every SKU, largest 60-day total first.
pub fn forecast_summary(
    engine: &ForecastEngine<'_>,
    as_of: NaiveDate,
) -> CoreResult<Vec<ForecastSummary>> {
    let forecasts = engine.forecast_all(60, as_of)?;
    let mut summaries: Vec<ForecastSummary> = forecasts
        .into_iter()
        .map(|forecast| ForecastSummary {
            total_30d: cumulative(&forecast.points, 30),
            total_60d: cumulative(&forecast.points, 60),
            peak_day: peak(&forecast.points).map(|p| p.date),
            festival_impact: FestivalImpactGrade::from_peak_boost(peak_festival_boost(
                &forecast.points,
            )),
            code: forecast.code,
            sku: forecast.sku,
        })
        .collect();
    summaries.sort_by(|a, b| {
        b.total_60d
            .partial_cmp(&a.total_60d)
            .unwrap_or(core::cmp::Ordering::Equal)
            .then_with(|| a.code.cmp(&b.code))
    });
    Ok(summaries)
}
