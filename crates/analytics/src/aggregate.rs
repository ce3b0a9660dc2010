//! Dealer-level monthly series: YoY and MoM growth.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use dispatchiq_core::DatasetSnapshot;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month.clamp(1, 12) - 1) as usize]
}

/// One calendar month with growth versus the same month a year earlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyComparison {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub units: u64,
    pub revenue: f64,
    /// None when the prior-year month has no sales.
    pub growth_pct: Option<f64>,
}

/// One calendar month with growth versus the preceding month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomPoint {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub units: u64,
    pub revenue: f64,
    pub mom_growth_pct: Option<f64>,
}

fn monthly_totals(snapshot: &DatasetSnapshot) -> BTreeMap<(i32, u32), (u64, f64)> {
    let mut totals: BTreeMap<(i32, u32), (u64, f64)> = BTreeMap::new();
    for record in snapshot.sales() {
        let entry = totals
            .entry((record.date.year(), record.date.month()))
            .or_insert((0, 0.0));
        entry.0 += u64::from(record.quantity);
        entry.1 += record.revenue();
    }
    totals
}

/// All-SKU monthly totals with year-over-year growth, chronological.
pub fn yoy_monthly(snapshot: &DatasetSnapshot) -> Vec<MonthlyComparison> {
    let totals = monthly_totals(snapshot);
    totals
        .iter()
        .map(|(&(year, month), &(units, revenue))| {
            let growth_pct = totals.get(&(year - 1, month)).and_then(|&(prev, _)| {
                (prev > 0).then(|| (units as f64 - prev as f64) / prev as f64 * 100.0)
            });
            MonthlyComparison {
                year,
                month,
                month_name: month_name(month),
                units,
                revenue,
                growth_pct,
            }
        })
        .collect()
}

/// The most recent `recent_months` months with month-on-month growth.
pub fn mom_monthly(snapshot: &DatasetSnapshot, recent_months: usize) -> Vec<MomPoint> {
    let totals = monthly_totals(snapshot);
    let rows: Vec<((i32, u32), (u64, f64))> = totals.into_iter().collect();
    let start = rows.len().saturating_sub(recent_months);

    let mut points = Vec::with_capacity(rows.len() - start);
    for i in start..rows.len() {
        let ((year, month), (units, revenue)) = rows[i];
        let prev_units = (i > 0).then(|| (rows[i - 1].1).0);
        let mom_growth_pct = prev_units
            .and_then(|prev| (prev > 0).then(|| (units as f64 - prev as f64) / prev as f64 * 100.0));
        points.push(MomPoint {
            year,
            month,
            month_name: month_name(month),
            units,
            revenue,
            mom_growth_pct,
        });
    }
    points
}
