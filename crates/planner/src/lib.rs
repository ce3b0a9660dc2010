//! `dispatchiq-planner`: risk scoring and dispatch planning.
//!
//! Turns the lead-time forecast and the current stock position into ordered
//! dispatch recommendations with working-capital pricing, plus a CSV export
//! in the dealer-facing layout.

pub mod export;
pub mod plan;
pub mod risk;

pub use export::export_csv;
pub use plan::{
    BUFFER_PCT, DispatchPlan, DispatchPlanner, DispatchRecommendation, HIGH_RISK_SCORE,
    MAX_LEAD_TIME_DAYS, PlanError, StockSource, WorkingCapitalSummary,
};
pub use risk::{
    HIGH_IMPACT_PCT, OVERSTOCK_THRESHOLD, RiskAssessment, RiskType, UNDERSTOCK_THRESHOLD,
    classify, festival_proximity_risk, score,
};
