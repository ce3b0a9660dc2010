//! Stock-position risk scoring.
//!
//! Converts a lead-time demand forecast plus the current stock position into
//! stockout/overstock probabilities and one composite score. Classification
//! reads the raw probabilities, never the composite, so a clamped display
//! score cannot mask a genuine stockout signal.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use dispatchiq_calendar::FestivalCalendar;

/// Raw stockout probability above which a SKU is classified understock.
pub const UNDERSTOCK_THRESHOLD: f64 = 0.30;
/// Raw overstock probability above which a SKU is classified overstock.
pub const OVERSTOCK_THRESHOLD: f64 = 0.35;
/// Festivals below this demand impact do not contribute proximity risk.
pub const HIGH_IMPACT_PCT: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskType {
    Understock,
    Overstock,
    Neutral,
}

impl std::fmt::Display for RiskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskType::Understock => write!(f, "understock"),
            RiskType::Overstock => write!(f, "overstock"),
            RiskType::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub stockout_prob: f64,
    pub overstock_prob: f64,
    pub festival_proximity_risk: f64,
    /// Weighted composite, clamped to [0, 1] for display. The weighted sum
    /// itself is not bounded, so never classify from this field.
    pub score: f64,
    pub risk_type: RiskType,
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Pure function of the raw probabilities. Stockout dominates: a SKU can be
/// short for a festival even while carrying slow colours.
pub fn classify(stockout_prob: f64, overstock_prob: f64) -> RiskType {
    if stockout_prob > UNDERSTOCK_THRESHOLD {
        RiskType::Understock
    } else if overstock_prob > OVERSTOCK_THRESHOLD {
        RiskType::Overstock
    } else {
        RiskType::Neutral
    }
}

/// Score one SKU's position. `forecast_units` is the cumulative forecast over
/// the lead time; a zero forecast yields zero probabilities and neutral.
pub fn score(
    forecast_units: f64,
    current_stock: u32,
    festival_proximity_risk: f64,
) -> RiskAssessment {
    let stock = f64::from(current_stock);
    let stockout_prob = if forecast_units > 0.0 {
        clamp01((forecast_units - stock) / forecast_units)
    } else {
        0.0
    };
    let overstock_prob = if forecast_units > 0.0 {
        clamp01((stock - forecast_units) / stock.max(1.0))
    } else {
        0.0
    };

    let raw = 0.40 * (stockout_prob - overstock_prob)
        + 0.30 * stockout_prob
        + 0.20 * overstock_prob
        + 0.10 * festival_proximity_risk;

    RiskAssessment {
        stockout_prob,
        overstock_prob,
        festival_proximity_risk,
        score: clamp01(raw),
        risk_type: classify(stockout_prob, overstock_prob),
    }
}

/// Proximity of the next heavyweight festival, graded by closeness.
///
/// Looks for the highest-impact festival (impact >= 40%) whose pre-festival
/// window opens within `lead_time_days` of `as_of`. An already-open window
/// scores 1.0; a window opening on the last lead-time day scores near 0.
pub fn festival_proximity_risk(
    calendar: &FestivalCalendar,
    as_of: NaiveDate,
    lead_time_days: u32,
) -> f64 {
    let lead = i64::from(lead_time_days);
    // Event dates can sit up to a pre-window past the lead-time boundary.
    let candidate = calendar
        .upcoming(as_of, lead + 30)
        .into_iter()
        .filter(|f| f.event.impact_pct >= HIGH_IMPACT_PCT)
        .filter(|f| (f.event.window_start() - as_of).num_days() <= lead)
        .max_by(|a, b| {
            a.event
                .impact_pct
                .partial_cmp(&b.event.impact_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    match candidate {
        Some(f) => {
            let days_until_open = (f.event.window_start() - as_of).num_days();
            if days_until_open <= 0 {
                1.0
            } else {
                clamp01(1.0 - days_until_open as f64 / lead as f64)
            }
        }
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn zero_stock_is_certain_stockout() {
        let r = score(500.0, 0, 0.0);
        assert_eq!(r.stockout_prob, 1.0);
        assert_eq!(r.overstock_prob, 0.0);
        assert_eq!(r.risk_type, RiskType::Understock);
        assert!((r.score - 0.70).abs() < 1e-9);
    }

    #[test]
    fn double_stock_is_overstock() {
        let r = score(40.0, 80, 0.0);
        assert_eq!(r.stockout_prob, 0.0);
        assert!((r.overstock_prob - 0.5).abs() < 1e-9);
        assert_eq!(r.risk_type, RiskType::Overstock);
    }

    #[test]
    fn zero_forecast_is_neutral() {
        let r = score(0.0, 37, 0.0);
        assert_eq!(r.stockout_prob, 0.0);
        assert_eq!(r.overstock_prob, 0.0);
        assert_eq!(r.risk_type, RiskType::Neutral);
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn balanced_stock_scores_only_festival_term() {
        let r = score(100.0, 100, 0.8);
        assert_eq!(r.risk_type, RiskType::Neutral);
        assert!((r.score - 0.08).abs() < 1e-9);
    }

    #[test]
    fn negative_composite_clamps_to_zero_but_still_classifies() {
        // Huge stock against a tiny forecast: raw composite goes negative.
        let r = score(1.0, 1000, 0.0);
        assert_eq!(r.score, 0.0);
        assert_eq!(r.risk_type, RiskType::Overstock);
    }

    #[test]
    fn proximity_ramps_toward_window_open() {
        let calendar = FestivalCalendar::builtin();
        // Diwali 2025 (20 Oct, 60% impact) opens its 21-day window on 29 Sep.
        let week_out = festival_proximity_risk(&calendar, d(2025, 9, 22), 21);
        assert!((week_out - (1.0 - 7.0 / 21.0)).abs() < 1e-9);

        let inside = festival_proximity_risk(&calendar, d(2025, 10, 5), 21);
        assert_eq!(inside, 1.0);

        let far = festival_proximity_risk(&calendar, d(2025, 6, 1), 14);
        assert_eq!(far, 0.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn classification_is_deterministic_and_consistent(
            forecast in 0.0f64..5000.0,
            stock in 0u32..5000,
            fest in 0.0f64..1.0,
        ) {
            let a = score(forecast, stock, fest);
            let b = score(forecast, stock, fest);
            prop_assert_eq!(a.clone(), b);
            prop_assert!((0.0..=1.0).contains(&a.score));
            prop_assert!((0.0..=1.0).contains(&a.stockout_prob));
            prop_assert!((0.0..=1.0).contains(&a.overstock_prob));
            prop_assert_eq!(a.risk_type, classify(a.stockout_prob, a.overstock_prob));
        }
    }
}
