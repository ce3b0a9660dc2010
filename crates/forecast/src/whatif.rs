//! What-if simulation: replay the forecast under a perturbed assumption.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use dispatchiq_analytics::{SeasonalProfileBuilder, SkuProfiles};
use dispatchiq_calendar::FestivalCalendar;
use dispatchiq_core::{CoreError, CoreResult, DatasetSnapshot};

use crate::engine::{ForecastEngine, cumulative};

/// Scenarios run over a fixed horizon so deltas are comparable.
pub const WHAT_IF_HORIZON_DAYS: u32 = 60;

/// +1% fuel price ≈ −0.3% two-wheeler demand (price-sensitive market).
pub const FUEL_PRICE_ELASTICITY: f64 = 0.3;

/// Recognised perturbations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum Scenario {
    /// Move the resolved Diwali date by N days (negative = earlier).
    DiwaliShift { days: i64 },
    /// Fuel price change in percent; demand moves by the elasticity.
    FuelPrice { pct_change: f64 },
    /// Competitor launch severity, 0.0-1.0; demand scales by `1 − impact`.
    CompetitorLaunch { impact: f64 },
    /// Extra auspicious (muhurat) days appended to every marriage window.
    MarriageSeason { extra_days: i64 },
}

impl Scenario {
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::DiwaliShift { .. } => "diwali_shift",
            Scenario::FuelPrice { .. } => "fuel_price",
            Scenario::CompetitorLaunch { .. } => "competitor_launch",
            Scenario::MarriageSeason { .. } => "marriage_season",
        }
    }

    pub fn parameter(&self) -> f64 {
        match *self {
            Scenario::DiwaliShift { days } => days as f64,
            Scenario::FuelPrice { pct_change } => pct_change,
            Scenario::CompetitorLaunch { impact } => impact,
            Scenario::MarriageSeason { extra_days } => extra_days as f64,
        }
    }

    fn validate(&self) -> CoreResult<()> {
        match *self {
            Scenario::DiwaliShift { days } => {
                if days.abs() > 90 {
                    return Err(CoreError::invalid_parameter(format!(
                        "diwali_shift must be within ±90 days, got {days}"
                    )));
                }
            }
            Scenario::FuelPrice { pct_change } => {
                if !pct_change.is_finite() {
                    return Err(CoreError::invalid_parameter("fuel_price change must be finite"));
                }
            }
            Scenario::CompetitorLaunch { impact } => {
                if !impact.is_finite() || !(0.0..=1.0).contains(&impact) {
                    return Err(CoreError::invalid_parameter(format!(
                        "competitor_launch impact must be in [0, 1], got {impact}"
                    )));
                }
            }
            Scenario::MarriageSeason { extra_days } => {
                if !(0..=60).contains(&extra_days) {
                    return Err(CoreError::invalid_parameter(format!(
                        "marriage_season extra_days must be 0-60, got {extra_days}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Baseline vs adjusted totals over the fixed horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIfOutcome {
    pub scenario: String,
    pub parameter: f64,
    pub baseline_units: f64,
    pub adjusted_units: f64,
    pub delta_units: f64,
    pub delta_pct: f64,
    pub affected_skus: Vec<String>,
    pub notes: String,
}

fn horizon_total(
    engine: &ForecastEngine<'_>,
    as_of: NaiveDate,
    sku_filter: Option<&[String]>,
) -> CoreResult<f64> {
    let forecasts = engine.forecast_all(WHAT_IF_HORIZON_DAYS, as_of)?;
    Ok(forecasts
        .iter()
        .filter(|f| sku_filter.map_or(true, |codes| codes.contains(&f.code)))
        .map(|f| cumulative(&f.points, WHAT_IF_HORIZON_DAYS as usize))
        .sum())
}

fn affected_codes(profiles: &SkuProfiles, sku_filter: Option<&[String]>) -> Vec<String> {
    profiles
        .iter_sorted()
        .into_iter()
        .map(|p| p.code.clone())
        .filter(|code| sku_filter.map_or(true, |codes| codes.contains(code)))
        .collect()
}

/// Run one scenario against a snapshot and report the delta.
pub fn simulate(
    snapshot: &DatasetSnapshot,
    calendar: &FestivalCalendar,
    scenario: Scenario,
    as_of: NaiveDate,
    sku_filter: Option<&[String]>,
) -> CoreResult<WhatIfOutcome> {
    scenario.validate()?;

    let profiles = SeasonalProfileBuilder::build(snapshot);
    let baseline_engine = ForecastEngine::new(&profiles, calendar);
    let baseline_units = horizon_total(&baseline_engine, as_of, sku_filter)?;

    let mut base_scale = 1.0;
    let mut calendar_override: Option<FestivalCalendar> = None;
    let mut notes = String::new();
    match scenario {
        Scenario::DiwaliShift { days } => {
            calendar_override = Some(calendar.with_shifted("Diwali", days));
            notes = format!(
                "Diwali shifted {days:+} days; demand pulls {}",
                if days < 0 { "forward" } else { "later" }
            );
        }
        Scenario::FuelPrice { pct_change } => {
            let demand_effect = -pct_change * FUEL_PRICE_ELASTICITY / 100.0;
            base_scale = 1.0 + demand_effect;
            notes = format!(
                "Fuel price {pct_change:+}% -> estimated demand change {:.1}%",
                demand_effect * 100.0
            );
        }
        Scenario::CompetitorLaunch { impact } => {
            base_scale = 1.0 - impact;
            notes = format!(
                "Competitor launch (impact {impact}) -> estimated demand drop {:.1}%",
                impact * 100.0
            );
        }
        Scenario::MarriageSeason { extra_days } => {
            calendar_override = Some(calendar.with_extended_marriage_windows(extra_days));
            notes = format!("{extra_days} extra marriage muhurat days appended to each window");
        }
    }

    let adjusted_calendar = calendar_override.as_ref().unwrap_or(calendar);
    let adjusted_engine =
        ForecastEngine::new(&profiles, adjusted_calendar).with_base_scale(base_scale);
    let adjusted_units = horizon_total(&adjusted_engine, as_of, sku_filter)?;

    let delta_units = adjusted_units - baseline_units;
    let delta_pct = if baseline_units > 0.0 {
        delta_units / baseline_units * 100.0
    } else {
        notes.push_str("; baseline is zero, delta_pct undefined");
        0.0
    };

    tracing::debug!(
        scenario = scenario.name(),
        baseline_units,
        adjusted_units,
        "what-if simulation complete"
    );

    Ok(WhatIfOutcome {
        scenario: scenario.name().to_string(),
        parameter: scenario.parameter(),
        baseline_units,
        adjusted_units,
        delta_units,
        delta_pct,
        affected_skus: affected_codes(&profiles, sku_filter),
        notes,
    })
}
