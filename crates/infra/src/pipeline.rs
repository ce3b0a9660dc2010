//! One facade over the whole decision pipeline.
//!
//! Owns the snapshot store and the festival calendar, and exposes the
//! operations a front end calls: upload, forecast, dispatch planning, alerts
//! and what-if simulation. Every operation loads one snapshot handle up front
//! and computes entirely against it.

use std::sync::Arc;

use chrono::NaiveDate;

use dispatchiq_alerts::{Alert, AlertContext};
use dispatchiq_analytics::{DashboardSummary, SeasonalProfileBuilder, dashboard_summary};
use dispatchiq_calendar::FestivalCalendar;
use dispatchiq_core::{CoreResult, DatasetSnapshot, SalesRecord, SnapshotVersion, StockLevel};
use dispatchiq_forecast::{
    ForecastEngine, ForecastPoint, ForecastSummary, Scenario, WhatIfOutcome, forecast_summary,
    simulate,
};
use dispatchiq_planner::{DispatchPlan, DispatchPlanner, RiskType, export_csv};

use crate::sample_data::sample_snapshot;
use crate::snapshot_store::SnapshotStore;

/// Company lead time from dispatch order to stock arrival.
pub const DEFAULT_LEAD_TIME_DAYS: u32 = 21;

pub struct DecisionEngine {
    store: Arc<SnapshotStore>,
    calendar: FestivalCalendar,
}

impl DecisionEngine {
    pub fn new(snapshot: DatasetSnapshot) -> Self {
        Self::with_calendar(snapshot, FestivalCalendar::builtin())
    }

    pub fn with_calendar(snapshot: DatasetSnapshot, calendar: FestivalCalendar) -> Self {
        Self {
            store: Arc::new(SnapshotStore::new(snapshot)),
            calendar,
        }
    }

    /// Engine seeded with the four-year demo dataset.
    pub fn with_demo_data() -> Self {
        Self::new(sample_snapshot())
    }

    pub fn store(&self) -> Arc<SnapshotStore> {
        self.store.clone()
    }

    pub fn calendar(&self) -> &FestivalCalendar {
        &self.calendar
    }

    /// Replace the dataset with a fresh upload. In-flight computations keep
    /// the snapshot they started with.
    pub fn upload(
        &self,
        sales: Vec<SalesRecord>,
        stock: Option<Vec<StockLevel>>,
    ) -> SnapshotVersion {
        self.store.replace(DatasetSnapshot::new(sales, stock))
    }

    /// Daily forecast series for one SKU code.
    pub fn forecast(
        &self,
        sku_code: &str,
        horizon_days: u32,
        as_of: NaiveDate,
    ) -> CoreResult<Vec<ForecastPoint>> {
        let snapshot = self.store.load();
        let profiles = SeasonalProfileBuilder::build(&snapshot);
        let engine = ForecastEngine::new(&profiles, &self.calendar);
        engine.forecast_by_code(sku_code, horizon_days, as_of)
    }

    /// 60-day forecast summaries for every SKU, busiest first.
    pub fn forecast_summaries(&self, as_of: NaiveDate) -> CoreResult<Vec<ForecastSummary>> {
        let snapshot = self.store.load();
        let profiles = SeasonalProfileBuilder::build(&snapshot);
        let engine = ForecastEngine::new(&profiles, &self.calendar);
        forecast_summary(&engine, as_of)
    }

    pub fn plan(&self, lead_time_days: u32, as_of: NaiveDate) -> CoreResult<DispatchPlan> {
        let snapshot = self.store.load();
        DispatchPlanner::plan(&snapshot, &self.calendar, lead_time_days, as_of)
    }

    /// The dispatch plan rendered as downloadable CSV.
    pub fn plan_csv(&self, lead_time_days: u32, as_of: NaiveDate) -> CoreResult<String> {
        Ok(export_csv(&self.plan(lead_time_days, as_of)?))
    }

    /// Current alerts. Overstock classifications come from a default-lead
    /// dispatch plan over the same snapshot.
    pub fn alerts(&self, as_of: NaiveDate) -> CoreResult<Vec<Alert>> {
        let snapshot = self.store.load();
        let plan =
            DispatchPlanner::plan(&snapshot, &self.calendar, DEFAULT_LEAD_TIME_DAYS, as_of)?;
        let overstock: Vec<String> = plan
            .recommendations
            .iter()
            .filter(|r| r.risk.risk_type == RiskType::Overstock)
            .map(|r| r.sku_code.clone())
            .collect();

        Ok(dispatchiq_alerts::generate(&AlertContext {
            snapshot: &snapshot,
            calendar: &self.calendar,
            overstock_codes: &overstock,
            as_of,
        }))
    }

    pub fn what_if(
        &self,
        scenario: Scenario,
        as_of: NaiveDate,
        sku_filter: Option<&[String]>,
    ) -> CoreResult<WhatIfOutcome> {
        let snapshot = self.store.load();
        simulate(&snapshot, &self.calendar, scenario, as_of, sku_filter)
    }

    pub fn dashboard(&self, as_of: NaiveDate) -> Option<DashboardSummary> {
        let snapshot = self.store.load();
        dashboard_summary(&snapshot, as_of)
    }
}
