//! `dispatchiq-calendar`: festival intelligence for the Indian two-wheeler
//! market.
//!
//! Resolves named festivals and marriage-season windows to concrete per-year
//! dates, computes the demand multiplier a given date sits under, and supports
//! perturbed views (shifted festival dates, extended marriage windows) for
//! what-if simulation. Year resolutions are cached; the almanac is consulted
//! once per year even when a horizon crosses a year boundary.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub mod almanac;

pub use almanac::{
    AlmanacSource, BuiltinAlmanac, DEFAULT_PRE_WINDOW_DAYS, FestivalCategory, FestivalEvent,
    MarriageSeasonWindow,
};

/// A festival seen from a reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingFestival {
    pub event: FestivalEvent,
    pub days_away: i64,
}

/// Composite demand multiplier for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FestivalImpact {
    /// 1.0 when the date sits in no pre-festival window. Overlapping windows
    /// compose multiplicatively.
    pub multiplier: f64,
    /// Names of the festivals whose windows contain the date.
    pub contributing: Vec<String>,
}

impl FestivalImpact {
    fn none() -> Self {
        Self {
            multiplier: 1.0,
            contributing: Vec::new(),
        }
    }
}

/// Marriage-season position of a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarriageStatus {
    pub in_season: bool,
    /// The window the date falls in, or the next one to open.
    pub window: Option<MarriageSeasonWindow>,
    /// 0 while in season, otherwise days until the next window opens.
    pub days_away: i64,
}

/// One year's impact record of a festival, for trend displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FestivalHistoryPoint {
    pub year: i32,
    pub date: NaiveDate,
    pub impact_pct: f64,
}

#[derive(Debug, Clone)]
struct YearTable {
    festivals: Vec<FestivalEvent>,
    windows: Vec<MarriageSeasonWindow>,
    /// Windows as the almanac resolved them, before any scenario extension.
    base_windows: Vec<MarriageSeasonWindow>,
}

/// Festival calendar with per-year caching and scenario views.
pub struct FestivalCalendar {
    almanac: Arc<dyn AlmanacSource>,
    /// Scenario: per-festival date shifts in days, keyed by lowercased name.
    shifts: HashMap<String, i64>,
    /// Scenario: marriage windows run this many extra days past their end.
    marriage_extension_days: i64,
    cache: RwLock<HashMap<i32, Arc<YearTable>>>,
}

impl FestivalCalendar {
    pub fn new(almanac: Arc<dyn AlmanacSource>) -> Self {
        Self {
            almanac,
            shifts: HashMap::new(),
            marriage_extension_days: 0,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Calendar backed by the built-in 2021-2026 almanac.
    pub fn builtin() -> Self {
        Self::new(Arc::new(BuiltinAlmanac))
    }

    /// Derived view with one festival's date moved by `days` in every year.
    /// The base calendar is untouched.
    pub fn with_shifted(&self, festival_name: &str, days: i64) -> Self {
        let mut shifts = self.shifts.clone();
        shifts.insert(festival_name.to_ascii_lowercase(), days);
        Self {
            almanac: Arc::clone(&self.almanac),
            shifts,
            marriage_extension_days: self.marriage_extension_days,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Derived view with every marriage window extended by `days`.
    pub fn with_extended_marriage_windows(&self, days: i64) -> Self {
        Self {
            almanac: Arc::clone(&self.almanac),
            shifts: self.shifts.clone(),
            marriage_extension_days: self.marriage_extension_days + days.max(0),
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn year_table(&self, year: i32) -> Arc<YearTable> {
        if let Some(table) = self.cache.read().ok().and_then(|c| c.get(&year).cloned()) {
            return table;
        }

        let mut festivals = self.almanac.festivals_for_year(year);
        for event in &mut festivals {
            if let Some(shift) = self.shifts.get(&event.name.to_ascii_lowercase()) {
                event.date += Duration::days(*shift);
            }
        }
        festivals.sort_by_key(|f| f.date);

        let base_windows = self.almanac.marriage_windows_for_year(year);
        let windows = base_windows
            .iter()
            .cloned()
            .map(|mut w| {
                w.end += Duration::days(self.marriage_extension_days);
                w
            })
            .collect();

        let table = Arc::new(YearTable {
            festivals,
            windows,
            base_windows,
        });
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(year, Arc::clone(&table));
        }
        table
    }

    /// Concrete date of a named festival in one year. `None` when the almanac
    /// has no entry; callers treat that as zero impact, never as a failure.
    pub fn resolve(&self, festival_name: &str, year: i32) -> Option<NaiveDate> {
        self.year_table(year)
            .festivals
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(festival_name))
            .map(|f| f.date)
    }

    /// Festivals within `days_ahead` days of `from`, nearest first.
    pub fn upcoming(&self, from: NaiveDate, days_ahead: i64) -> Vec<UpcomingFestival> {
        let cutoff = from + Duration::days(days_ahead.max(0));
        let mut results = Vec::new();
        for year in from.year()..=cutoff.year() {
            for event in &self.year_table(year).festivals {
                if from <= event.date && event.date <= cutoff {
                    results.push(UpcomingFestival {
                        days_away: (event.date - from).num_days(),
                        event: event.clone(),
                    });
                }
            }
        }
        results.sort_by_key(|u| u.event.date);
        results
    }

    /// Demand multiplier the date sits under.
    ///
    /// Each festival whose pre-window contains the date contributes a linear
    /// ramp from 1.0 at the window start to `1 + impact_pct/100` on the event
    /// day. Overlapping windows (the Dhanteras-Diwali-Bhai Dooj cluster)
    /// compose multiplicatively so joint clustering is not under-counted.
    pub fn impact_at(&self, date: NaiveDate) -> FestivalImpact {
        let mut impact = FestivalImpact::none();
        // A festival early next January can open its window in December.
        for year in [date.year(), date.year() + 1] {
            for event in &self.year_table(year).festivals {
                let days_to = (event.date - date).num_days();
                if days_to < 0 || days_to > event.pre_window_days {
                    continue;
                }
                let ramp = 1.0 - days_to as f64 / event.pre_window_days as f64;
                impact.multiplier *= 1.0 + event.impact_pct / 100.0 * ramp;
                impact.contributing.push(event.name.clone());
            }
        }
        impact
    }

    /// Whether the date falls in a marriage season, and where the next window
    /// sits if not.
    pub fn marriage_status(&self, date: NaiveDate) -> MarriageStatus {
        let table = self.year_table(date.year());
        if let Some(window) = table.windows.iter().find(|w| w.contains(date)) {
            return MarriageStatus {
                in_season: true,
                window: Some(window.clone()),
                days_away: 0,
            };
        }

        let mut next: Option<&MarriageSeasonWindow> = None;
        let next_table = self.year_table(date.year() + 1);
        for window in table.windows.iter().chain(next_table.windows.iter()) {
            if window.start > date && next.map_or(true, |n| window.start < n.start) {
                next = Some(window);
            }
        }
        MarriageStatus {
            in_season: false,
            days_away: next.map_or(0, |w| (w.start - date).num_days()),
            window: next.cloned(),
        }
    }

    /// Extra multiplier for dates inside a scenario-extended stretch of a
    /// marriage window (and not inside the base window). 1.0 in the baseline.
    pub fn marriage_extension_multiplier(&self, date: NaiveDate) -> f64 {
        if self.marriage_extension_days == 0 {
            return 1.0;
        }
        let table = self.year_table(date.year());
        for (extended, base) in table.windows.iter().zip(table.base_windows.iter()) {
            if extended.contains(date) && !base.contains(date) {
                return 1.0 + extended.uplift_pct / 100.0;
            }
        }
        1.0
    }

    /// Dates and impact of one festival across every almanac year, ascending.
    pub fn festival_history(&self, festival_name: &str) -> Vec<FestivalHistoryPoint> {
        let mut points: Vec<FestivalHistoryPoint> = self
            .almanac
            .years()
            .into_iter()
            .filter_map(|year| {
                self.year_table(year)
                    .festivals
                    .iter()
                    .find(|f| f.name.eq_ignore_ascii_case(festival_name))
                    .map(|f| FestivalHistoryPoint {
                        year,
                        date: f.date,
                        impact_pct: f.impact_pct,
                    })
            })
            .collect();
        points.sort_by_key(|p| p.year);
        points
    }
}

impl core::fmt::Debug for FestivalCalendar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FestivalCalendar")
            .field("shifts", &self.shifts)
            .field("marriage_extension_days", &self.marriage_extension_days)
            .finish_non_exhaustive()
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
    fn resolve_finds_known_festivals() {
        let cal = FestivalCalendar::builtin();
        assert_eq!(cal.resolve("Diwali", 2025), Some(d(2025, 10, 20)));
        assert_eq!(cal.resolve("diwali", 2021), Some(d(2021, 11, 4)));
        assert_eq!(cal.resolve("Diwali", 2019), None);
        assert_eq!(cal.resolve("Karva Chauth", 2025), None);
    }

    #[test]
    fn upcoming_is_ordered_nearest_first() {
        let cal = FestivalCalendar::builtin();
        let upcoming = cal.upcoming(d(2025, 9, 1), 90);
        let names: Vec<&str> = upcoming.iter().map(|u| u.event.name.as_str()).collect();
        assert_eq!(names, vec!["Navratri", "Dussehra", "Dhanteras", "Diwali", "Bhai Dooj"]);
        assert_eq!(upcoming[0].days_away, 21);
        assert!(upcoming.windows(2).all(|w| w[0].days_away <= w[1].days_away));
    }

    #[test]
    fn upcoming_crosses_the_year_boundary() {
        let cal = FestivalCalendar::builtin();
        let upcoming = cal.upcoming(d(2025, 12, 20), 40);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].event.name, "Pongal");
        assert_eq!(upcoming[0].event.date, d(2026, 1, 14));
    }

    #[test]
    fn impact_ramps_linearly_to_the_event_day() {
        let cal = FestivalCalendar::builtin();
        // Holi 2025 is Mar 14, impact 15%, pre-window 14 days; its window
        // [Feb 28, Mar 14] overlaps nothing else that year.
        let at_window_start = cal.impact_at(d(2025, 2, 28));
        assert!((at_window_start.multiplier - 1.0).abs() < 1e-9);
        assert_eq!(at_window_start.contributing, vec!["Holi".to_string()]);

        let halfway = cal.impact_at(d(2025, 3, 7));
        assert!((halfway.multiplier - 1.075).abs() < 1e-9);

        let on_the_day = cal.impact_at(d(2025, 3, 14));
        assert!((on_the_day.multiplier - 1.15).abs() < 1e-9);

        // Outside every window.
        let quiet = cal.impact_at(d(2025, 7, 1));
        assert!((quiet.multiplier - 1.0).abs() < 1e-9);
        assert!(quiet.contributing.is_empty());
    }

    #[test]
    fn overlapping_windows_compose_multiplicatively() {
        let cal = FestivalCalendar::builtin();
        // Dhanteras day 2025 (Oct 18) also sits inside the Diwali (Oct 20,
        // pre 21) and Bhai Dooj (Oct 22, pre 14) windows.
        let impact = cal.impact_at(d(2025, 10, 18));
        assert!(impact.contributing.contains(&"Dhanteras".to_string()));
        assert!(impact.contributing.contains(&"Diwali".to_string()));
        assert!(impact.contributing.contains(&"Bhai Dooj".to_string()));

        let dhanteras = 1.5;
        let diwali = 1.0 + 0.60 * (1.0 - 2.0 / 21.0);
        let bhai_dooj = 1.0 + 0.20 * (1.0 - 4.0 / 14.0);
        assert!((impact.multiplier - dhanteras * diwali * bhai_dooj).abs() < 1e-9);
        // Strictly above any single contribution.
        assert!(impact.multiplier > dhanteras);
    }

    #[test]
    fn missing_almanac_year_degrades_to_no_impact() {
        let cal = FestivalCalendar::builtin();
        let impact = cal.impact_at(d(2030, 10, 20));
        assert!((impact.multiplier - 1.0).abs() < 1e-9);
        assert!(impact.contributing.is_empty());
    }

    #[test]
    fn marriage_status_reports_current_and_next_window() {
        let cal = FestivalCalendar::builtin();

        let in_winter = cal.marriage_status(d(2025, 11, 15));
        assert!(in_winter.in_season);
        assert_eq!(in_winter.days_away, 0);
        assert_eq!(in_winter.window.unwrap().season, "Winter");

        // Mid-January: Spring opens Feb 1.
        let between = cal.marriage_status(d(2025, 1, 10));
        assert!(!between.in_season);
        assert_eq!(between.days_away, 22);
        assert_eq!(between.window.unwrap().season, "Spring");

        // Mid-October: Winter opens Nov 1.
        let pre_winter = cal.marriage_status(d(2025, 10, 12));
        assert!(!pre_winter.in_season);
        assert_eq!(pre_winter.days_away, 20);
    }

    #[test]
    fn shifted_view_moves_one_festival_only() {
        let cal = FestivalCalendar::builtin();
        let shifted = cal.with_shifted("Diwali", -7);
        assert_eq!(shifted.resolve("Diwali", 2025), Some(d(2025, 10, 13)));
        assert_eq!(shifted.resolve("Dhanteras", 2025), Some(d(2025, 10, 18)));
        // Base calendar is untouched.
        assert_eq!(cal.resolve("Diwali", 2025), Some(d(2025, 10, 20)));
    }

    #[test]
    fn extended_marriage_window_uplifts_only_the_extension() {
        let cal = FestivalCalendar::builtin().with_extended_marriage_windows(10);
        // Spring 2025 ends May 31; Jun 5 falls in the extension.
        assert!((cal.marriage_extension_multiplier(d(2025, 6, 5)) - 1.20).abs() < 1e-9);
        // Inside the base window: no extra multiplier.
        assert!((cal.marriage_extension_multiplier(d(2025, 5, 20)) - 1.0).abs() < 1e-9);
        // Well past the extension.
        assert!((cal.marriage_extension_multiplier(d(2025, 6, 15)) - 1.0).abs() < 1e-9);
        // Baseline calendar never applies it.
        let base = FestivalCalendar::builtin();
        assert!((base.marriage_extension_multiplier(d(2025, 6, 5)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn festival_history_spans_the_almanac_years() {
        let cal = FestivalCalendar::builtin();
        let history = cal.festival_history("Diwali");
        assert_eq!(history.len(), 6);
        assert_eq!(history[0].year, 2021);
        assert_eq!(history[0].date, d(2021, 11, 4));
        assert!(history.iter().all(|p| (p.impact_pct - 60.0).abs() < 1e-9));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(512))]

        // Festival windows only ever add demand.
        #[test]
        fn impact_never_drops_below_one(offset in 0i64..2192) {
            let cal = FestivalCalendar::builtin();
            let date = d(2021, 1, 1) + Duration::days(offset);
            let impact = cal.impact_at(date);
            prop_assert!(impact.multiplier >= 1.0 - 1e-12);
            if impact.contributing.is_empty() {
                prop_assert!((impact.multiplier - 1.0).abs() < 1e-12);
            }
        }
    }
}
