//! Day-by-day forecast generation.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use dispatchiq_analytics::{SkuProfile, SkuProfiles};
use dispatchiq_calendar::FestivalCalendar;
use dispatchiq_core::{CoreError, CoreResult, Sku};

/// Confidence band half-width at the start of the horizon.
pub const BASE_CI_WIDTH: f64 = 0.20;
/// Additional half-width accrued across the horizon (linear ramp).
pub const CI_WIDTH_SLOPE: f64 = 0.15;
/// Hard cap; nothing in dispatch planning looks further out than a year.
pub const MAX_HORIZON_DAYS: u32 = 365;

/// One forecast day for one SKU. Ephemeral; recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub sku_code: String,
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
    /// Festival multiplier in effect on this date (1.0 outside windows).
    pub festival_boost: f64,
    pub festival_names: Vec<String>,
}

/// Full horizon for one SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuForecast {
    pub code: String,
    pub sku: Sku,
    pub points: Vec<ForecastPoint>,
}

/// Deterministic decomposition forecaster.
///
/// `predicted(t) = base_daily_avg × seasonal[month(t)] × festival_multiplier(t)
/// × yoy_trend_factor`, with a base scale hook for what-if scenarios.
pub struct ForecastEngine<'a> {
    profiles: &'a SkuProfiles,
    calendar: &'a FestivalCalendar,
    base_scale: f64,
}

impl<'a> ForecastEngine<'a> {
    pub fn new(profiles: &'a SkuProfiles, calendar: &'a FestivalCalendar) -> Self {
        Self {
            profiles,
            calendar,
            base_scale: 1.0,
        }
    }

    /// Scenario hook: scale every SKU's base daily average.
    pub fn with_base_scale(mut self, scale: f64) -> Self {
        self.base_scale = scale;
        self
    }

    fn validate_horizon(horizon_days: u32) -> CoreResult<()> {
        if horizon_days == 0 || horizon_days > MAX_HORIZON_DAYS {
            return Err(CoreError::invalid_parameter(format!(
                "horizon_days must be 1-{MAX_HORIZON_DAYS}, got {horizon_days}"
            )));
        }
        Ok(())
    }

    /// Forecast one SKU by identity. A SKU with no history yields a zero
    /// series rather than failing the batch.
    pub fn forecast(
        &self,
        sku: &Sku,
        horizon_days: u32,
        as_of: NaiveDate,
    ) -> CoreResult<Vec<ForecastPoint>> {
        Self::validate_horizon(horizon_days)?;
        match self.profiles.get(sku) {
            Some(profile) => Ok(self.series(profile, horizon_days, as_of)),
            None => Ok(self.zero_series(&sku.to_string(), horizon_days, as_of)),
        }
    }

    /// Forecast one SKU by dealer part number.
    pub fn forecast_by_code(
        &self,
        sku_code: &str,
        horizon_days: u32,
        as_of: NaiveDate,
    ) -> CoreResult<Vec<ForecastPoint>> {
        Self::validate_horizon(horizon_days)?;
        match self.profiles.get_by_code(sku_code) {
            Some(profile) => Ok(self.series(profile, horizon_days, as_of)),
            None => Ok(self.zero_series(sku_code, horizon_days, as_of)),
        }
    }

    /// Forecast every SKU in the snapshot, in stable code order.
    pub fn forecast_all(
        &self,
        horizon_days: u32,
        as_of: NaiveDate,
    ) -> CoreResult<Vec<SkuForecast>> {
        Self::validate_horizon(horizon_days)?;
        let skus = self.profiles.iter_sorted();
        tracing::debug!(skus = skus.len(), horizon_days, %as_of, "running full forecast");
        Ok(skus
            .into_iter()
            .map(|profile| SkuForecast {
                code: profile.code.clone(),
                sku: profile.sku.clone(),
                points: self.series(profile, horizon_days, as_of),
            })
            .collect())
    }

    fn series(
        &self,
        profile: &SkuProfile,
        horizon_days: u32,
        as_of: NaiveDate,
    ) -> Vec<ForecastPoint> {
        let base = profile.base_daily_avg * self.base_scale;
        (0..horizon_days)
            .map(|offset| {
                let date = as_of + Duration::days(i64::from(offset));
                let impact = self.calendar.impact_at(date);
                let extension = self.calendar.marriage_extension_multiplier(date);
                let predicted = base
                    * profile.seasonal.factor_for(date.month())
                    * impact.multiplier
                    * extension
                    * profile.yoy_trend_factor;

                let width = ci_width(offset, horizon_days);
                ForecastPoint {
                    sku_code: profile.code.clone(),
                    date,
                    predicted,
                    lower: (predicted * (1.0 - width)).max(0.0),
                    upper: predicted * (1.0 + width),
                    festival_boost: impact.multiplier,
                    festival_names: impact.contributing,
                }
            })
            .collect()
    }

    fn zero_series(
        &self,
        sku_code: &str,
        horizon_days: u32,
        as_of: NaiveDate,
    ) -> Vec<ForecastPoint> {
        (0..horizon_days)
            .map(|offset| {
                let date = as_of + Duration::days(i64::from(offset));
                let impact = self.calendar.impact_at(date);
                ForecastPoint {
                    sku_code: sku_code.to_string(),
                    date,
                    predicted: 0.0,
                    lower: 0.0,
                    upper: 0.0,
                    festival_boost: impact.multiplier,
                    festival_names: impact.contributing,
                }
            })
            .collect()
    }
}

/// Confidence half-width for the day at `offset` into a horizon.
pub fn ci_width(offset: u32, horizon_days: u32) -> f64 {
    let horizon_fraction = f64::from(offset) / f64::from(horizon_days.max(1));
    BASE_CI_WIDTH + horizon_fraction * CI_WIDTH_SLOPE
}

/// Sum of predicted units over the first `days` points.
pub fn cumulative(points: &[ForecastPoint], days: usize) -> f64 {
    points.iter().take(days).map(|p| p.predicted).sum()
}

/// The single highest-demand day of the series.
pub fn peak(points: &[ForecastPoint]) -> Option<&ForecastPoint> {
    points
        .iter()
        .max_by(|a, b| a.predicted.partial_cmp(&b.predicted).unwrap_or(core::cmp::Ordering::Equal))
}

/// Highest festival multiplier seen across the series.
pub fn peak_festival_boost(points: &[ForecastPoint]) -> f64 {
    points.iter().map(|p| p.festival_boost).fold(1.0, f64::max)
}
