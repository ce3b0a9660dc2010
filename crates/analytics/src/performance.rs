//! Per-SKU and per-colour performance views over the snapshot.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use dispatchiq_core::{DatasetSnapshot, Sku};

use crate::aggregate::{MomPoint, mom_monthly, month_name};

/// A SKU whose 90-day run rate falls below this many units per month is a
/// slow mover.
pub const SLOW_MOVER_MONTHLY_UNITS: f64 = 5.0;

/// Performance metrics for one SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuPerformance {
    pub code: String,
    pub sku: Sku,
    pub total_units: u64,
    pub total_revenue: f64,
    pub yoy_growth_pct: Option<f64>,
    pub mom_growth_pct: Option<f64>,
    pub last_month_units: u64,
    pub current_month_units: u64,
    pub avg_monthly_units: f64,
    /// Trailing 90-day units per day, as of the reference date.
    pub velocity_90d: f64,
    pub is_slow_moving: bool,
    /// 0.0 (healthy velocity) to 1.0 (no movement).
    pub dead_stock_risk: f64,
}

fn month_start(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
}

fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

/// Per-SKU performance, sorted by lifetime units descending.
pub fn sku_performance(snapshot: &DatasetSnapshot, as_of: NaiveDate) -> Vec<SkuPerformance> {
    let mut grouped: HashMap<Sku, Vec<&dispatchiq_core::SalesRecord>> = HashMap::new();
    for record in snapshot.sales() {
        grouped.entry(record.sku.clone()).or_default().push(record);
    }

    let current_start = month_start(as_of.year(), as_of.month());
    let (lm_year, lm_month) = prev_month(as_of.year(), as_of.month());
    let last_month_start = month_start(lm_year, lm_month);
    let this_year_start = month_start(as_of.year(), 1);
    let last_year_start = month_start(as_of.year() - 1, 1);
    let velocity_window_start = as_of - Duration::days(89);

    let mut rows: Vec<SkuPerformance> = grouped
        .into_iter()
        .map(|(sku, records)| {
            let code = records[0].sku_code.clone();
            let mut total_units: u64 = 0;
            let mut total_revenue = 0.0;
            let mut current_month_units: u64 = 0;
            let mut last_month_units: u64 = 0;
            let mut this_year: u64 = 0;
            let mut last_year: u64 = 0;
            let mut window_units: u64 = 0;
            let mut months: BTreeMap<(i32, u32), ()> = BTreeMap::new();

            for record in &records {
                let qty = u64::from(record.quantity);
                total_units += qty;
                total_revenue += record.revenue();
                months.insert((record.date.year(), record.date.month()), ());

                if record.date >= current_start && record.date <= as_of {
                    current_month_units += qty;
                }
                if record.date >= last_month_start && record.date < current_start {
                    last_month_units += qty;
                }
                if record.date >= this_year_start && record.date <= as_of {
                    this_year += qty;
                }
                if record.date >= last_year_start && record.date < this_year_start {
                    last_year += qty;
                }
                if record.date >= velocity_window_start && record.date <= as_of {
                    window_units += qty;
                }
            }

            let yoy_growth_pct = (last_year > 0)
                .then(|| (this_year as f64 - last_year as f64) / last_year as f64 * 100.0);
            let mom_growth_pct = (last_month_units > 0).then(|| {
                (current_month_units as f64 - last_month_units as f64) / last_month_units as f64
                    * 100.0
            });

            let avg_monthly_units = total_units as f64 / months.len().max(1) as f64;
            let velocity_90d = window_units as f64 / 90.0;
            let is_slow_moving = velocity_90d * 30.0 < SLOW_MOVER_MONTHLY_UNITS;
            let dead_stock_risk = (1.0 - avg_monthly_units / 10.0).clamp(0.0, 1.0);

            SkuPerformance {
                code,
                sku,
                total_units,
                total_revenue,
                yoy_growth_pct,
                mom_growth_pct,
                last_month_units,
                current_month_units,
                avg_monthly_units,
                velocity_90d,
                is_slow_moving,
                dead_stock_risk,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.total_units.cmp(&a.total_units).then_with(|| a.code.cmp(&b.code)));
    rows
}

/// Sales share and YoY growth per colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColourBreakdown {
    pub colour: String,
    pub total_units: u64,
    pub revenue: f64,
    pub share_pct: f64,
    pub yoy_growth_pct: Option<f64>,
}

pub fn colour_analysis(snapshot: &DatasetSnapshot, as_of: NaiveDate) -> Vec<ColourBreakdown> {
    let this_year_start = month_start(as_of.year(), 1);
    let last_year_start = month_start(as_of.year() - 1, 1);

    let mut per_colour: HashMap<String, (u64, f64, u64, u64)> = HashMap::new();
    let mut grand_total: u64 = 0;
    for record in snapshot.sales() {
        let qty = u64::from(record.quantity);
        grand_total += qty;
        let entry = per_colour
            .entry(record.sku.colour.clone())
            .or_insert((0, 0.0, 0, 0));
        entry.0 += qty;
        entry.1 += record.revenue();
        if record.date >= this_year_start && record.date <= as_of {
            entry.2 += qty;
        }
        if record.date >= last_year_start && record.date < this_year_start {
            entry.3 += qty;
        }
    }

    let mut rows: Vec<ColourBreakdown> = per_colour
        .into_iter()
        .map(|(colour, (total_units, revenue, ty, ly))| ColourBreakdown {
            colour,
            total_units,
            revenue,
            share_pct: if grand_total > 0 {
                total_units as f64 / grand_total as f64 * 100.0
            } else {
                0.0
            },
            yoy_growth_pct: (ly > 0).then(|| (ty as f64 - ly as f64) / ly as f64 * 100.0),
        })
        .collect();
    rows.sort_by(|a, b| b.total_units.cmp(&a.total_units).then_with(|| a.colour.cmp(&b.colour)));
    rows
}

/// Dealer-level month-of-year table with derived seasonal factors and
/// calendar flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalPatternRow {
    pub month: u32,
    pub month_name: &'static str,
    pub avg_units: f64,
    pub seasonal_factor: f64,
    pub is_festive_month: bool,
    pub is_marriage_month: bool,
    pub is_monsoon_month: bool,
}

pub fn seasonal_patterns(snapshot: &DatasetSnapshot) -> Vec<SeasonalPatternRow> {
    let mut totals: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for record in snapshot.sales() {
        *totals
            .entry((record.date.year(), record.date.month()))
            .or_insert(0) += u64::from(record.quantity);
    }
    if totals.is_empty() {
        return Vec::new();
    }

    let mut sums = [0.0_f64; 12];
    let mut counts = [0_u32; 12];
    for (&(_, month), &units) in &totals {
        sums[(month - 1) as usize] += units as f64;
        counts[(month - 1) as usize] += 1;
    }
    let means: Vec<f64> = (0..12)
        .map(|i| if counts[i] > 0 { sums[i] / f64::from(counts[i]) } else { 0.0 })
        .collect();
    let present = counts.iter().filter(|&&c| c > 0).count().max(1);
    let overall = means.iter().sum::<f64>() / present as f64;

    (1..=12)
        .map(|month| {
            let avg_units = means[(month - 1) as usize];
            SeasonalPatternRow {
                month,
                month_name: month_name(month),
                avg_units,
                seasonal_factor: if overall > 0.0 { avg_units / overall } else { 1.0 },
                is_festive_month: matches!(month, 3 | 10 | 11 | 12),
                is_marriage_month: matches!(month, 2..=5 | 11 | 12),
                is_monsoon_month: matches!(month, 6..=8),
            }
        })
        .collect()
}

/// Headline KPIs for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "'de: 'static"))]
pub struct DashboardSummary {
    pub total_units_ytd: u64,
    pub total_revenue_ytd: f64,
    pub yoy_growth_pct: f64,
    pub top_sku_code: String,
    pub top_model: String,
    pub top_colour: String,
    pub monthly_trend: Vec<MomPoint>,
    pub sku_rankings: Vec<SkuPerformance>,
}

/// None when the snapshot is empty.
pub fn dashboard_summary(snapshot: &DatasetSnapshot, as_of: NaiveDate) -> Option<DashboardSummary> {
    if snapshot.is_empty() {
        return None;
    }

    let this_year_start = month_start(as_of.year(), 1);
    let last_year_start = month_start(as_of.year() - 1, 1);
    let last_year_cutoff = last_year_start + (as_of - this_year_start);

    let mut ytd_units: u64 = 0;
    let mut ytd_revenue = 0.0;
    let mut ly_units: u64 = 0;
    let mut per_model: HashMap<&str, u64> = HashMap::new();
    let mut per_colour: HashMap<&str, u64> = HashMap::new();
    for record in snapshot.sales() {
        let qty = u64::from(record.quantity);
        if record.date >= this_year_start && record.date <= as_of {
            ytd_units += qty;
            ytd_revenue += record.revenue();
        }
        if record.date >= last_year_start && record.date <= last_year_cutoff {
            ly_units += qty;
        }
        *per_model.entry(record.sku.model.as_str()).or_insert(0) += qty;
        *per_colour.entry(record.sku.colour.as_str()).or_insert(0) += qty;
    }

    let yoy_growth_pct = if ly_units > 0 {
        (ytd_units as f64 - ly_units as f64) / ly_units as f64 * 100.0
    } else {
        0.0
    };

    let rankings = sku_performance(snapshot, as_of);
    let top_sku_code = rankings.first().map(|r| r.code.clone()).unwrap_or_default();
    let pick_max = |map: HashMap<&str, u64>| {
        map.into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, _)| name.to_string())
            .unwrap_or_default()
    };

    Some(DashboardSummary {
        total_units_ytd: ytd_units,
        total_revenue_ytd: ytd_revenue,
        yoy_growth_pct,
        top_sku_code,
        top_model: pick_max(per_model),
        top_colour: pick_max(per_colour),
        monthly_trend: mom_monthly(snapshot, 12),
        sku_rankings: rankings.into_iter().take(10).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatchiq_core::SalesRecord;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn record(code: &str, colour: &str, date: NaiveDate, qty: u32) -> SalesRecord {
        SalesRecord {
            sku_code: code.to_string(),
            sku: Sku::new("Splendor Plus", "Standard", colour),
            date,
            quantity: qty,
            unit_price: 72_000.0,
            location: None,
        }
    }

    #[test]
    fn slow_mover_is_flagged_from_trailing_velocity() {
        let as_of = d(2024, 12, 15);
        let snapshot = DatasetSnapshot::new(
            vec![
                // Busy SKU: 30 units inside the 90-day window.
                record("FAST", "Black", d(2024, 11, 1), 30),
                // Stale SKU: all volume long before the window.
                record("SLOW", "Grey", d(2024, 1, 10), 40),
                record("SLOW", "Grey", d(2024, 12, 1), 1),
            ],
            None,
        );
        let rows = sku_performance(&snapshot, as_of);
        let fast = rows.iter().find(|r| r.code == "FAST").unwrap();
        let slow = rows.iter().find(|r| r.code == "SLOW").unwrap();

        assert!(!fast.is_slow_moving);
        assert!(slow.is_slow_moving);
        assert!(slow.velocity_90d * 30.0 < SLOW_MOVER_MONTHLY_UNITS);
        // Rankings are by lifetime units.
        assert_eq!(rows[0].code, "SLOW");
    }

    #[test]
    fn yoy_and_mom_growth_per_sku() {
        let as_of = d(2024, 11, 20);
        let snapshot = DatasetSnapshot::new(
            vec![
                record("A", "Black", d(2023, 6, 1), 100),
                record("A", "Black", d(2024, 6, 1), 150),
                record("A", "Black", d(2024, 10, 5), 40),
                record("A", "Black", d(2024, 11, 5), 50),
            ],
            None,
        );
        let rows = sku_performance(&snapshot, as_of);
        let a = &rows[0];
        // This year 240 vs last year 100.
        assert!((a.yoy_growth_pct.unwrap() - 140.0).abs() < 1e-9);
        // November 50 vs October 40.
        assert!((a.mom_growth_pct.unwrap() - 25.0).abs() < 1e-9);
        assert_eq!(a.current_month_units, 50);
        assert_eq!(a.last_month_units, 40);
    }

    #[test]
    fn colour_shares_sum_to_one_hundred() {
        let snapshot = DatasetSnapshot::new(
            vec![
                record("A", "Black", d(2024, 5, 1), 60),
                record("B", "Pearl White", d(2024, 5, 2), 40),
            ],
            None,
        );
        let rows = colour_analysis(&snapshot, d(2024, 6, 1));
        assert_eq!(rows[0].colour, "Black");
        assert!((rows[0].share_pct - 60.0).abs() < 1e-9);
        let total: f64 = rows.iter().map(|r| r.share_pct).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn seasonal_patterns_flag_festive_and_monsoon_months() {
        let snapshot = DatasetSnapshot::new(
            vec![
                record("A", "Black", d(2024, 7, 1), 50),
                record("A", "Black", d(2024, 10, 1), 150),
            ],
            None,
        );
        let rows = seasonal_patterns(&snapshot);
        assert_eq!(rows.len(), 12);
        let october = &rows[9];
        assert!(october.is_festive_month);
        assert!(october.seasonal_factor > 1.0);
        let july = &rows[6];
        assert!(july.is_monsoon_month);
        assert!(!july.is_festive_month);
    }

    #[test]
    fn dashboard_summary_picks_top_performers() {
        let as_of = d(2024, 11, 1);
        let snapshot = DatasetSnapshot::new(
            vec![
                record("A", "Black", d(2024, 3, 1), 120),
                record("B", "Pearl White", d(2024, 4, 1), 30),
            ],
            None,
        );
        let summary = dashboard_summary(&snapshot, as_of).unwrap();
        assert_eq!(summary.total_units_ytd, 150);
        assert_eq!(summary.top_sku_code, "A");
        assert_eq!(summary.top_colour, "Black");
        assert_eq!(summary.top_model, "Splendor Plus");

        assert!(dashboard_summary(&DatasetSnapshot::empty(), as_of).is_none());
    }
}
