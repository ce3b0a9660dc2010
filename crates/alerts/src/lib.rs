//! `dispatchiq-alerts`: rule-based operational alerts.
//!
//! A closed set of rules, each a pure predicate plus constructor over the
//! snapshot, the festival calendar and the reference date. Evaluation is
//! stateless: the same inputs always produce the same alerts, in the same
//! order, with the same ids.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use dispatchiq_analytics::{SkuPerformance, sku_performance};
use dispatchiq_calendar::FestivalCalendar;
use dispatchiq_core::DatasetSnapshot;

/// Festival impact at or above this makes its proximity alert high priority.
pub const HIGH_PRIORITY_IMPACT_PCT: f64 = 50.0;
/// Slow-mover count at or above this escalates the alert to high priority.
pub const SLOW_MOVER_ESCALATION_COUNT: usize = 5;
/// YoY growth above this flags the top performer.
pub const HIGH_GROWTH_YOY_PCT: f64 = 20.0;
const MARRIAGE_APPROACH_DAYS: i64 = 30;
const FESTIVAL_LOOKAHEAD_DAYS: i64 = 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    FestivalApproaching,
    MarriageSeason,
    MarriageSeasonApproaching,
    SlowMovingInventory,
    HighGrowthSku,
    YearEndClearance,
}

/// Declaration order is sort order: high first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Sequential id in rule-evaluation order, starting at 1.
    pub id: u32,
    pub alert_type: AlertType,
    pub priority: Priority,
    pub title: String,
    pub message: String,
    pub related_festival: Option<String>,
    pub sku_code: Option<String>,
    pub action_required: bool,
}

/// Everything the rules read. `overstock_codes` comes from the dispatch
/// planner's classification of the same snapshot.
pub struct AlertContext<'a> {
    pub snapshot: &'a DatasetSnapshot,
    pub calendar: &'a FestivalCalendar,
    pub overstock_codes: &'a [String],
    pub as_of: NaiveDate,
}

struct Draft {
    alert_type: AlertType,
    priority: Priority,
    title: String,
    message: String,
    related_festival: Option<String>,
    sku_code: Option<String>,
    action_required: bool,
}

type Rule = fn(&AlertContext<'_>, &[SkuPerformance], &mut Vec<Draft>);

const RULES: &[Rule] = &[
    festival_approaching,
    marriage_season,
    slow_moving_inventory,
    high_growth_sku,
    year_end_clearance,
];

/// Evaluate every rule against the context. Output is sorted high to low;
/// ids reflect evaluation order and survive the sort.
pub fn generate(ctx: &AlertContext<'_>) -> Vec<Alert> {
    let performance = sku_performance(ctx.snapshot, ctx.as_of);
    let mut drafts = Vec::new();
    for rule in RULES {
        rule(ctx, &performance, &mut drafts);
    }

    let mut alerts: Vec<Alert> = drafts
        .into_iter()
        .enumerate()
        .map(|(i, d)| Alert {
            id: i as u32 + 1,
            alert_type: d.alert_type,
            priority: d.priority,
            title: d.title,
            message: d.message,
            related_festival: d.related_festival,
            sku_code: d.sku_code,
            action_required: d.action_required,
        })
        .collect();
    alerts.sort_by_key(|a| a.priority);

    tracing::debug!(count = alerts.len(), as_of = %ctx.as_of, "alerts generated");
    alerts
}

/// One alert per festival whose pre-festival buying window contains `as_of`.
fn festival_approaching(
    ctx: &AlertContext<'_>,
    _performance: &[SkuPerformance],
    out: &mut Vec<Draft>,
) {
    for upcoming in ctx.calendar.upcoming(ctx.as_of, FESTIVAL_LOOKAHEAD_DAYS) {
        let event = &upcoming.event;
        if event.window_start() > ctx.as_of {
            continue;
        }
        let priority = if event.impact_pct >= HIGH_PRIORITY_IMPACT_PCT {
            Priority::High
        } else {
            Priority::Medium
        };
        out.push(Draft {
            alert_type: AlertType::FestivalApproaching,
            priority,
            title: format!("{} in {} days!", event.name, upcoming.days_away),
            message: format!(
                "{} is {} days away. Expected demand uplift: +{:.0}%. Ensure adequate \
                 stock is dispatched now to cover the {}-day pre-festival buying window.",
                event.name, upcoming.days_away, event.impact_pct, event.pre_window_days
            ),
            related_festival: Some(event.name.clone()),
            sku_code: None,
            action_required: true,
        });
    }
}

/// Active marriage season, or one opening within 30 days.
fn marriage_season(ctx: &AlertContext<'_>, _performance: &[SkuPerformance], out: &mut Vec<Draft>) {
    let status = ctx.calendar.marriage_status(ctx.as_of);
    let Some(window) = status.window else {
        return;
    };

    if status.in_season {
        let colours = window.colours.iter().take(3).cloned().collect::<Vec<_>>();
        let kinds = window.vehicle_kinds.join(", ");
        out.push(Draft {
            alert_type: AlertType::MarriageSeason,
            priority: Priority::Medium,
            title: format!("Marriage Season Active: {} Season", window.season),
            message: format!(
                "Wedding season is currently active. Expect +{:.0}% demand uplift \
                 ({kinds}). High-demand colours: {}.",
                window.uplift_pct,
                colours.join(", ")
            ),
            related_festival: Some("Marriage Season".to_string()),
            sku_code: None,
            action_required: true,
        });
    } else if status.days_away <= MARRIAGE_APPROACH_DAYS {
        let colours = window.colours.iter().take(3).cloned().collect::<Vec<_>>();
        out.push(Draft {
            alert_type: AlertType::MarriageSeasonApproaching,
            priority: Priority::Medium,
            title: format!("Marriage Season Approaching ({} days)", status.days_away),
            message: format!(
                "{} marriage season starts in {} days. Plan dispatch for: {}.",
                window.season,
                status.days_away,
                colours.join(", ")
            ),
            related_festival: Some("Marriage Season".to_string()),
            sku_code: None,
            action_required: true,
        });
    }
}

fn slow_moving_inventory(
    _ctx: &AlertContext<'_>,
    performance: &[SkuPerformance],
    out: &mut Vec<Draft>,
) {
    let slow: Vec<&SkuPerformance> = performance.iter().filter(|s| s.is_slow_moving).collect();
    if slow.is_empty() {
        return;
    }
    let priority = if slow.len() >= SLOW_MOVER_ESCALATION_COUNT {
        Priority::High
    } else {
        Priority::Medium
    };
    let named: Vec<String> = slow
        .iter()
        .take(3)
        .map(|s| format!("{} {}", s.sku.model, s.sku.colour))
        .collect();
    let suffix = if slow.len() > 3 { " and more" } else { "" };
    out.push(Draft {
        alert_type: AlertType::SlowMovingInventory,
        priority,
        title: format!("{} Slow-Moving SKU(s) Detected", slow.len()),
        message: format!(
            "The following SKUs show low sales velocity: {}{}. Consider promotional \
             pricing or reducing dispatch quantities to avoid dead stock.",
            named.join(", "),
            suffix
        ),
        related_festival: None,
        sku_code: None,
        action_required: true,
    });
}

/// Top performer growing faster than 20% YoY. Informational only.
fn high_growth_sku(_ctx: &AlertContext<'_>, performance: &[SkuPerformance], out: &mut Vec<Draft>) {
    let Some(top) = performance.first() else {
        return;
    };
    let Some(yoy) = top.yoy_growth_pct else {
        return;
    };
    if yoy <= HIGH_GROWTH_YOY_PCT {
        return;
    }
    out.push(Draft {
        alert_type: AlertType::HighGrowthSku,
        priority: Priority::Low,
        title: format!(
            "{} {} Growing Fast (+{:.0}% YoY)",
            top.sku.model, top.sku.colour, yoy
        ),
        message: format!(
            "{} {} is your fastest growing SKU this year with +{:.0}% YoY growth. \
             Ensure sufficient dispatch.",
            top.sku.model, top.sku.colour, yoy
        ),
        related_festival: None,
        sku_code: Some(top.code.clone()),
        action_required: false,
    });
}

/// Fires only in December or March, and only when something is overstocked.
fn year_end_clearance(
    ctx: &AlertContext<'_>,
    _performance: &[SkuPerformance],
    out: &mut Vec<Draft>,
) {
    if !matches!(ctx.as_of.month(), 12 | 3) || ctx.overstock_codes.is_empty() {
        return;
    }
    out.push(Draft {
        alert_type: AlertType::YearEndClearance,
        priority: Priority::Medium,
        title: "Year-End Clearance Opportunity".to_string(),
        message: format!(
            "Financial year-end approaching with {} overstocked SKU(s). Identify \
             slow-moving variants for promotional clearance to free working capital.",
            ctx.overstock_codes.len()
        ),
        related_festival: None,
        sku_code: None,
        action_required: true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dispatchiq_core::{SalesRecord, Sku};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn record(code: &str, sku: &Sku, date: NaiveDate, qty: u32) -> SalesRecord {
        SalesRecord {
            sku_code: code.to_string(),
            sku: sku.clone(),
            date,
            quantity: qty,
            unit_price: 75_000.0,
            location: None,
        }
    }

    /// Daily seller at `per_day` units from 2023-01-01 through the given end.
    fn steady_seller(code: &str, colour: &str, per_day: u32, until: NaiveDate) -> Vec<SalesRecord> {
        let sku = Sku::new("Splendor Plus", "Standard", colour);
        let mut out = Vec::new();
        let mut date = d(2023, 1, 1);
        while date <= until {
            out.push(record(code, &sku, date, per_day));
            date += Duration::days(1);
        }
        out
    }

    fn ctx<'a>(
        snapshot: &'a DatasetSnapshot,
        calendar: &'a FestivalCalendar,
        overstock: &'a [String],
        as_of: NaiveDate,
    ) -> AlertContext<'a> {
        AlertContext {
            snapshot,
            calendar,
            overstock_codes: overstock,
            as_of,
        }
    }

    #[test]
    fn festival_window_produces_prioritised_alerts() {
        // 2025-10-10 sits inside the Dhanteras (50%), Diwali (60%) and
        // Bhai Dooj (20%) windows; Navratri and Dussehra are already past.
        let snapshot =
            DatasetSnapshot::new(steady_seller("HER-SPL-STD-BLK", "Black", 2, d(2025, 10, 9)), None);
        let calendar = FestivalCalendar::builtin();
        let alerts = generate(&ctx(&snapshot, &calendar, &[], d(2025, 10, 10)));

        let festival: Vec<&Alert> = alerts
            .iter()
            .filter(|a| a.alert_type == AlertType::FestivalApproaching)
            .collect();
        let names: Vec<&str> = festival
            .iter()
            .map(|a| a.related_festival.as_deref().unwrap())
            .collect();
        assert!(names.contains(&"Diwali"));
        assert!(names.contains(&"Dhanteras"));

        let diwali = festival
            .iter()
            .find(|a| a.related_festival.as_deref() == Some("Diwali"))
            .unwrap();
        assert_eq!(diwali.priority, Priority::High);
        assert!(diwali.action_required);
        assert_eq!(diwali.title, "Diwali in 10 days!");
    }

    #[test]
    fn quiet_midsummer_yields_no_festival_or_marriage_alerts() {
        let snapshot =
            DatasetSnapshot::new(steady_seller("HER-SPL-STD-BLK", "Black", 2, d(2025, 6, 14)), None);
        let calendar = FestivalCalendar::builtin();
        let alerts = generate(&ctx(&snapshot, &calendar, &[], d(2025, 6, 15)));

        assert!(!alerts.iter().any(|a| matches!(
            a.alert_type,
            AlertType::FestivalApproaching
                | AlertType::MarriageSeason
                | AlertType::MarriageSeasonApproaching
        )));
    }

    #[test]
    fn marriage_season_active_and_approaching() {
        let snapshot =
            DatasetSnapshot::new(steady_seller("HER-SPL-STD-BLK", "Black", 2, d(2025, 11, 14)), None);
        let calendar = FestivalCalendar::builtin();

        let active = generate(&ctx(&snapshot, &calendar, &[], d(2025, 11, 15)));
        let season = active
            .iter()
            .find(|a| a.alert_type == AlertType::MarriageSeason)
            .unwrap();
        assert_eq!(season.priority, Priority::Medium);
        assert!(season.title.contains("Winter"));

        // Mid-October: Winter opens Nov 1, 20 days out.
        let approaching = generate(&ctx(&snapshot, &calendar, &[], d(2025, 10, 12)));
        let soon = approaching
            .iter()
            .find(|a| a.alert_type == AlertType::MarriageSeasonApproaching)
            .unwrap();
        assert!(soon.title.contains("20 days"));
    }

    #[test]
    fn slow_movers_escalate_at_five() {
        let end = d(2025, 6, 14);
        // Four dormant SKUs: sold early, nothing in the trailing 90 days.
        let mut sales = Vec::new();
        for (i, colour) in ["Black", "Red", "Blue", "Grey"].iter().enumerate() {
            let sku = Sku::new("Passion Pro", "Standard", *colour);
            sales.push(record(&format!("HER-PAS-STD-{i}"), &sku, d(2023, 5, 1), 30));
        }
        sales.extend(steady_seller("HER-SPL-STD-BLK", "Black", 2, end));
        let snapshot = DatasetSnapshot::new(sales.clone(), None);
        let calendar = FestivalCalendar::builtin();

        let alerts = generate(&ctx(&snapshot, &calendar, &[], d(2025, 6, 15)));
        let slow = alerts
            .iter()
            .find(|a| a.alert_type == AlertType::SlowMovingInventory)
            .unwrap();
        assert_eq!(slow.priority, Priority::Medium);
        assert!(slow.title.starts_with("4 Slow-Moving"));

        // A fifth dormant SKU tips the rule to high priority.
        let sku = Sku::new("Passion Pro", "Standard", "Green");
        sales.push(record("HER-PAS-STD-4", &sku, d(2023, 5, 1), 30));
        let snapshot = DatasetSnapshot::new(sales, None);
        let alerts = generate(&ctx(&snapshot, &calendar, &[], d(2025, 6, 15)));
        let slow = alerts
            .iter()
            .find(|a| a.alert_type == AlertType::SlowMovingInventory)
            .unwrap();
        assert_eq!(slow.priority, Priority::High);
    }

    #[test]
    fn top_performer_growth_is_informational() {
        // Top seller doubles its rate in 2025 against 2024.
        let sku = Sku::new("Xtreme 160R", "Standard", "Black");
        let mut sales = Vec::new();
        let mut date = d(2024, 1, 1);
        while date <= d(2024, 12, 31) {
            sales.push(record("HER-XTR-STD-BLK", &sku, date, 2));
            date += Duration::days(1);
        }
        let mut date = d(2025, 1, 1);
        while date <= d(2025, 6, 14) {
            sales.push(record("HER-XTR-STD-BLK", &sku, date, 8));
            date += Duration::days(1);
        }
        let snapshot = DatasetSnapshot::new(sales, None);
        let calendar = FestivalCalendar::builtin();

        let alerts = generate(&ctx(&snapshot, &calendar, &[], d(2025, 6, 15)));
        let growth = alerts
            .iter()
            .find(|a| a.alert_type == AlertType::HighGrowthSku)
            .unwrap();
        assert_eq!(growth.priority, Priority::Low);
        assert!(!growth.action_required);
        assert_eq!(growth.sku_code.as_deref(), Some("HER-XTR-STD-BLK"));
    }

    #[test]
    fn year_end_needs_both_month_and_overstock() {
        let snapshot =
            DatasetSnapshot::new(steady_seller("HER-SPL-STD-BLK", "Black", 2, d(2025, 3, 9)), None);
        let calendar = FestivalCalendar::builtin();
        let overstock = vec!["HER-SPL-STD-BLK".to_string()];

        let with_overstock = generate(&ctx(&snapshot, &calendar, &overstock, d(2025, 3, 10)));
        assert!(
            with_overstock
                .iter()
                .any(|a| a.alert_type == AlertType::YearEndClearance)
        );

        let without = generate(&ctx(&snapshot, &calendar, &[], d(2025, 3, 10)));
        assert!(
            !without
                .iter()
                .any(|a| a.alert_type == AlertType::YearEndClearance)
        );

        // Right month is June-adjacent: no rule fire even with overstock.
        let wrong_month = generate(&ctx(&snapshot, &calendar, &overstock, d(2025, 6, 10)));
        assert!(
            !wrong_month
                .iter()
                .any(|a| a.alert_type == AlertType::YearEndClearance)
        );
    }

    #[test]
    fn output_sorts_by_priority_with_sequential_ids() {
        // Early October: high festival alerts plus medium marriage-approach.
        let snapshot =
            DatasetSnapshot::new(steady_seller("HER-SPL-STD-BLK", "Black", 2, d(2025, 10, 9)), None);
        let calendar = FestivalCalendar::builtin();
        let alerts = generate(&ctx(&snapshot, &calendar, &[], d(2025, 10, 10)));

        assert!(!alerts.is_empty());
        assert!(alerts.windows(2).all(|w| w[0].priority <= w[1].priority));

        let mut ids: Vec<u32> = alerts.iter().map(|a| a.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=alerts.len() as u32).collect::<Vec<_>>());
    }
}
