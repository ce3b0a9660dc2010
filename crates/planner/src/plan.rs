//! Dispatch planning over a lead-time window.
//!
//! For every SKU with history: forecast demand over the lead time, read or
//! estimate stock on hand, derive the order quantity plus a 15% buffer, and
//! price the working-capital impact. One SKU's failure becomes an error row,
//! never an aborted batch.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use dispatchiq_analytics::SeasonalProfileBuilder;
use dispatchiq_calendar::FestivalCalendar;
use dispatchiq_core::{CoreError, CoreResult, DatasetSnapshot, Sku};
use dispatchiq_forecast::{ForecastEngine, cumulative, peak_festival_boost};

use crate::risk::{self, RiskAssessment, RiskType};

pub const MAX_LEAD_TIME_DAYS: u32 = 120;
/// Buffer stock on top of the recommended order.
pub const BUFFER_PCT: f64 = 0.15;
/// Composite score above which a SKU lands on the attention panel.
pub const HIGH_RISK_SCORE: f64 = 0.6;

const ESTIMATE_WINDOW_DAYS: i64 = 30;
const ESTIMATE_MULTIPLIER: f64 = 1.2;
const ESTIMATE_FLOOR: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockSource {
    Uploaded,
    Estimated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRecommendation {
    pub sku_code: String,
    pub sku: Sku,
    pub current_stock: u32,
    pub stock_source: StockSource,
    pub forecast_units: f64,
    pub recommended_quantity: u32,
    pub buffer_stock: u32,
    pub total_dispatch: u32,
    pub unit_price: f64,
    pub working_capital_impact: f64,
    /// Peak festival multiplier inside the lead-time window.
    pub festival_factor: f64,
    pub risk: RiskAssessment,
    pub notes: String,
}

/// Per-row failure inside an otherwise successful batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanError {
    pub sku_code: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingCapitalSummary {
    pub total_dispatch_value: f64,
    pub total_buffer_value: f64,
    /// Value tied up in rows classified overstock.
    pub dead_stock_exposure: f64,
    /// Dispatch value over trailing average daily revenue.
    pub capital_rotation_days: f64,
    /// Highest-scoring SKU codes above [`HIGH_RISK_SCORE`], capped at ten.
    pub high_risk_skus: Vec<String>,
    pub overstock_count: usize,
    pub understock_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchPlan {
    pub lead_time_days: u32,
    pub as_of: NaiveDate,
    pub recommendations: Vec<DispatchRecommendation>,
    pub errors: Vec<PlanError>,
    pub summary: WorkingCapitalSummary,
}

pub struct DispatchPlanner;

impl DispatchPlanner {
    /// Plan dispatch for every SKU in the snapshot, ordered by risk.
    pub fn plan(
        snapshot: &DatasetSnapshot,
        calendar: &FestivalCalendar,
        lead_time_days: u32,
        as_of: NaiveDate,
    ) -> CoreResult<DispatchPlan> {
        if lead_time_days == 0 || lead_time_days > MAX_LEAD_TIME_DAYS {
            return Err(CoreError::invalid_parameter(format!(
                "lead_time_days must be 1-{MAX_LEAD_TIME_DAYS}, got {lead_time_days}"
            )));
        }

        let profiles = SeasonalProfileBuilder::build(snapshot);
        let engine = ForecastEngine::new(&profiles, calendar);
        let proximity = risk::festival_proximity_risk(calendar, as_of, lead_time_days);

        let mut recommendations = Vec::new();
        let mut errors = Vec::new();
        for profile in profiles.iter_sorted() {
            let points = match engine.forecast_by_code(&profile.code, lead_time_days, as_of) {
                Ok(points) => points,
                Err(err) => {
                    errors.push(PlanError {
                        sku_code: profile.code.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            let forecast_units = cumulative(&points, lead_time_days as usize);

            let (current_stock, stock_source) = match snapshot.stock_on_hand(&profile.code) {
                Some(stock) => (stock, StockSource::Uploaded),
                None => (
                    estimate_stock(snapshot, &profile.code, as_of),
                    StockSource::Estimated,
                ),
            };

            let shortfall = (forecast_units - f64::from(current_stock)).max(0.0);
            let recommended_quantity = shortfall.ceil() as u32;
            // round() is round-half-away-from-zero, which is the documented policy
            let buffer_stock = (f64::from(recommended_quantity) * BUFFER_PCT).round() as u32;
            let total_dispatch = recommended_quantity + buffer_stock;

            let festival_factor = peak_festival_boost(&points);
            let assessment = risk::score(forecast_units, current_stock, proximity);
            let working_capital_impact = f64::from(total_dispatch) * profile.avg_unit_price;
            let notes = build_notes(festival_factor, assessment.risk_type);

            recommendations.push(DispatchRecommendation {
                sku_code: profile.code.clone(),
                sku: profile.sku.clone(),
                current_stock,
                stock_source,
                forecast_units,
                recommended_quantity,
                buffer_stock,
                total_dispatch,
                unit_price: profile.avg_unit_price,
                working_capital_impact,
                festival_factor,
                risk: assessment,
                notes,
            });
        }

        recommendations.sort_by(|a, b| {
            b.risk
                .score
                .total_cmp(&a.risk.score)
                .then_with(|| b.working_capital_impact.total_cmp(&a.working_capital_impact))
        });

        let summary = summarise(snapshot, &recommendations);
        tracing::info!(
            skus = recommendations.len(),
            errors = errors.len(),
            lead_time_days,
            understock = summary.understock_count,
            overstock = summary.overstock_count,
            "dispatch plan generated"
        );

        Ok(DispatchPlan {
            lead_time_days,
            as_of,
            recommendations,
            errors,
            summary,
        })
    }
}

/// Trailing 30-day velocity scaled by 1.2, floor 2. Used whenever no stock
/// sheet covers the SKU.
fn estimate_stock(snapshot: &DatasetSnapshot, sku_code: &str, as_of: NaiveDate) -> u32 {
    let window_start = as_of - Duration::days(ESTIMATE_WINDOW_DAYS);
    let units: u32 = snapshot
        .sales_for(sku_code)
        .filter(|r| r.date > window_start && r.date <= as_of)
        .map(|r| r.quantity)
        .sum();
    ((f64::from(units) * ESTIMATE_MULTIPLIER) as u32).max(ESTIMATE_FLOOR)
}

fn build_notes(festival_factor: f64, risk_type: RiskType) -> String {
    let mut parts = Vec::new();
    if festival_factor > 1.2 {
        let uplift = ((festival_factor - 1.0) * 100.0).round();
        parts.push(format!("Festival demand boost expected ({uplift:.0}% uplift)"));
    }
    match risk_type {
        RiskType::Understock => parts.push("Stockout risk, order urgently".to_string()),
        RiskType::Overstock => {
            parts.push("Current stock may cover demand, consider reducing dispatch".to_string());
        }
        RiskType::Neutral => {}
    }
    if parts.is_empty() {
        "Normal dispatch recommended".to_string()
    } else {
        parts.join(" | ")
    }
}

fn summarise(
    snapshot: &DatasetSnapshot,
    recommendations: &[DispatchRecommendation],
) -> WorkingCapitalSummary {
    let total_dispatch_value: f64 = recommendations
        .iter()
        .map(|r| r.working_capital_impact)
        .sum();
    let total_buffer_value: f64 = recommendations
        .iter()
        .map(|r| f64::from(r.buffer_stock) * r.unit_price)
        .sum();
    let dead_stock_exposure: f64 = recommendations
        .iter()
        .filter(|r| r.risk.risk_type == RiskType::Overstock)
        .map(|r| r.working_capital_impact)
        .sum();

    let avg_daily_revenue = snapshot.average_daily_revenue();
    let capital_rotation_days = total_dispatch_value / avg_daily_revenue.max(1.0);

    let high_risk_skus = recommendations
        .iter()
        .filter(|r| r.risk.score > HIGH_RISK_SCORE)
        .take(10)
        .map(|r| r.sku_code.clone())
        .collect();

    WorkingCapitalSummary {
        total_dispatch_value,
        total_buffer_value,
        dead_stock_exposure,
        capital_rotation_days,
        high_risk_skus,
        overstock_count: recommendations
            .iter()
            .filter(|r| r.risk.risk_type == RiskType::Overstock)
            .count(),
        understock_count: recommendations
            .iter()
            .filter(|r| r.risk.risk_type == RiskType::Understock)
            .count(),
    }
}
