//! Almanac source: per-year festival dates and marriage-season windows.
//!
//! Exact festival dates are lunar (Panchang-based) and shift every year, so
//! they are injected as a lookup table rather than computed. `BuiltinAlmanac`
//! carries verified dates for 2021-2026; a different table (e.g. loaded from
//! an external almanac feed) can be plugged in through `AlmanacSource`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Festival reach/kind. Drives nothing by itself; reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FestivalCategory {
    National,
    Regional,
    Auspicious,
}

/// A named event resolved to a concrete date for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FestivalEvent {
    pub name: String,
    pub category: FestivalCategory,
    pub region: String,
    pub date: NaiveDate,
    /// Expected demand uplift on the event day, in percent.
    pub impact_pct: f64,
    /// Demand ramps over this many days before the event.
    pub pre_window_days: i64,
}

impl FestivalEvent {
    /// First day of the pre-festival buying window.
    pub fn window_start(&self) -> NaiveDate {
        self.date - chrono::Duration::days(self.pre_window_days)
    }
}

/// A marriage-season window resolved to concrete dates for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarriageSeasonWindow {
    pub season: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Demand uplift while the season runs, in percent.
    pub uplift_pct: f64,
    /// Colours that historically move during this season.
    pub colours: Vec<String>,
    /// Vehicle categories the uplift concentrates in.
    pub vehicle_kinds: Vec<String>,
}

impl MarriageSeasonWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Source of per-year calendar data.
///
/// Implementations must be cheap to query repeatedly; `FestivalCalendar`
/// caches resolved years, so a table rebuild per call is acceptable.
pub trait AlmanacSource: Send + Sync {
    /// Years this source has data for, ascending.
    fn years(&self) -> Vec<i32>;

    /// All festivals for one year. Empty when the year is not covered.
    fn festivals_for_year(&self, year: i32) -> Vec<FestivalEvent>;

    /// Marriage-season windows for one year.
    fn marriage_windows_for_year(&self, year: i32) -> Vec<MarriageSeasonWindow>;
}

/// Pre-festival buying window lengths, in days. Festivals without a specific
/// entry use [`DEFAULT_PRE_WINDOW_DAYS`].
const PRE_WINDOWS: &[(&str, i64)] = &[
    ("Diwali", 21),
    ("Dhanteras", 14),
    ("Dussehra", 14),
    ("Navratri", 10),
    ("Akshaya Tritiya", 14),
    ("Onam", 21),
    ("Pongal", 10),
];

pub const DEFAULT_PRE_WINDOW_DAYS: i64 = 14;

fn pre_window_for(name: &str) -> i64 {
    PRE_WINDOWS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, days)| *days)
        .unwrap_or(DEFAULT_PRE_WINDOW_DAYS)
}

use FestivalCategory::{Auspicious, National, Regional};

/// (year, name, month, day, category, region, impact_pct)
type FestivalRow = (i32, &'static str, u32, u32, FestivalCategory, &'static str, f64);

/// Verified Panchang-derived dates, 2021-2026.
#[rustfmt::skip]
const FESTIVALS: &[FestivalRow] = &[
    (2021, "Pongal",          1, 14, Regional,   "South India", 30.0),
    (2021, "Maha Shivratri",  3, 11, Auspicious, "All India",   10.0),
    (2021, "Holi",            3, 29, National,   "All India",   15.0),
    (2021, "Eid ul-Fitr",     5, 13, National,   "All India",   20.0),
    (2021, "Akshaya Tritiya", 5, 14, Auspicious, "All India",   25.0),
    (2021, "Onam",            8, 21, Regional,   "Kerala",      35.0),
    (2021, "Navratri",       10,  7, National,   "All India",   25.0),
    (2021, "Dussehra",       10, 15, National,   "All India",   30.0),
    (2021, "Dhanteras",      11,  2, National,   "All India",   50.0),
    (2021, "Diwali",         11,  4, National,   "All India",   60.0),
    (2021, "Bhai Dooj",      11,  6, National,   "All India",   20.0),
    (2021, "Gurpurab",       11, 19, Regional,   "North India", 15.0),

    (2022, "Pongal",          1, 14, Regional,   "South India", 30.0),
    (2022, "Maha Shivratri",  3,  1, Auspicious, "All India",   10.0),
    (2022, "Holi",            3, 18, National,   "All India",   15.0),
    (2022, "Eid ul-Fitr",     5,  2, National,   "All India",   20.0),
    (2022, "Akshaya Tritiya", 5,  3, Auspicious, "All India",   25.0),
    (2022, "Onam",            9,  8, Regional,   "Kerala",      35.0),
    (2022, "Navratri",        9, 26, National,   "All India",   25.0),
    (2022, "Dussehra",       10,  5, National,   "All India",   30.0),
    (2022, "Dhanteras",      10, 22, National,   "All India",   50.0),
    (2022, "Diwali",         10, 24, National,   "All India",   60.0),
    (2022, "Bhai Dooj",      10, 26, National,   "All India",   20.0),

    (2023, "Pongal",          1, 14, Regional,   "South India", 30.0),
    (2023, "Maha Shivratri",  2, 18, Auspicious, "All India",   10.0),
    (2023, "Holi",            3,  8, National,   "All India",   15.0),
    (2023, "Eid ul-Fitr",     4, 21, National,   "All India",   20.0),
    (2023, "Akshaya Tritiya", 4, 22, Auspicious, "All India",   25.0),
    (2023, "Onam",            8, 29, Regional,   "Kerala",      35.0),
    (2023, "Navratri",       10, 15, National,   "All India",   25.0),
    (2023, "Dussehra",       10, 24, National,   "All India",   30.0),
    (2023, "Dhanteras",      11, 10, National,   "All India",   50.0),
    (2023, "Diwali",         11, 12, National,   "All India",   60.0),
    (2023, "Bhai Dooj",      11, 15, National,   "All India",   20.0),

    (2024, "Pongal",          1, 15, Regional,   "South India", 30.0),
    (2024, "Maha Shivratri",  3,  8, Auspicious, "All India",   10.0),
    (2024, "Holi",            3, 25, National,   "All India",   15.0),
    (2024, "Eid ul-Fitr",     4, 10, National,   "All India",   20.0),
    (2024, "Akshaya Tritiya", 5, 10, Auspicious, "All India",   25.0),
    (2024, "Onam",            9,  5, Regional,   "Kerala",      35.0),
    (2024, "Navratri",       10,  3, National,   "All India",   25.0),
    (2024, "Dussehra",       10, 12, National,   "All India",   30.0),
    (2024, "Dhanteras",      10, 29, National,   "All India",   50.0),
    (2024, "Diwali",         11,  1, National,   "All India",   60.0),
    (2024, "Bhai Dooj",      11,  3, National,   "All India",   20.0),
    (2024, "Gurpurab",       11, 15, Regional,   "North India", 15.0),

    (2025, "Pongal",          1, 14, Regional,   "South India", 30.0),
    (2025, "Maha Shivratri",  2, 26, Auspicious, "All India",   10.0),
    (2025, "Holi",            3, 14, National,   "All India",   15.0),
    (2025, "Eid ul-Fitr",     3, 30, National,   "All India",   20.0),
    (2025, "Akshaya Tritiya", 4, 30, Auspicious, "All India",   25.0),
    (2025, "Onam",            8, 27, Regional,   "Kerala",      35.0),
    (2025, "Navratri",        9, 22, National,   "All India",   25.0),
    (2025, "Dussehra",       10,  2, National,   "All India",   30.0),
    (2025, "Dhanteras",      10, 18, National,   "All India",   50.0),
    (2025, "Diwali",         10, 20, National,   "All India",   60.0),
    (2025, "Bhai Dooj",      10, 22, National,   "All India",   20.0),

    (2026, "Pongal",          1, 14, Regional,   "South India", 30.0),
    (2026, "Maha Shivratri",  2, 15, Auspicious, "All India",   10.0),
    (2026, "Holi",            3,  3, National,   "All India",   15.0),
    (2026, "Eid ul-Fitr",     3, 20, National,   "All India",   20.0),
    (2026, "Akshaya Tritiya", 4, 20, Auspicious, "All India",   25.0),
    (2026, "Onam",            8, 17, Regional,   "Kerala",      35.0),
    (2026, "Navratri",       10, 11, National,   "All India",   25.0),
    (2026, "Dussehra",       10, 20, National,   "All India",   30.0),
    (2026, "Dhanteras",      11,  6, National,   "All India",   50.0),
    (2026, "Diwali",         11,  8, National,   "All India",   60.0),
];

/// Marriage seasons recur on fixed month spans; colours reflect what dealers
/// actually move during wedding months.
struct SeasonSpec {
    season: &'static str,
    start_month: u32,
    end_month: u32,
    uplift_pct: f64,
    colours: &'static [&'static str],
    vehicle_kinds: &'static [&'static str],
}

const MARRIAGE_SEASONS: &[SeasonSpec] = &[
    SeasonSpec {
        season: "Winter",
        start_month: 11,
        end_month: 12,
        uplift_pct: 25.0,
        colours: &["Pearl White", "Sports Red", "Imperial Blue"],
        vehicle_kinds: &["scooter", "premium_bike"],
    },
    SeasonSpec {
        season: "Spring",
        start_month: 2,
        end_month: 5,
        uplift_pct: 20.0,
        colours: &["Pearl White", "Silver", "Sports Red"],
        vehicle_kinds: &["scooter", "standard_bike"],
    },
];

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_y, next_m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_y, next_m, 1)
        .map(|d| d - chrono::Duration::days(1))
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap_or_default())
}

/// Built-in table covering 2021-2026.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinAlmanac;

impl AlmanacSource for BuiltinAlmanac {
    fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = FESTIVALS.iter().map(|row| row.0).collect();
        years.dedup();
        years
    }

    fn festivals_for_year(&self, year: i32) -> Vec<FestivalEvent> {
        FESTIVALS
            .iter()
            .filter(|row| row.0 == year)
            .filter_map(|&(_, name, month, day, category, region, impact_pct)| {
                let date = NaiveDate::from_ymd_opt(year, month, day)?;
                Some(FestivalEvent {
                    name: name.to_string(),
                    category,
                    region: region.to_string(),
                    date,
                    impact_pct,
                    pre_window_days: pre_window_for(name),
                })
            })
            .collect()
    }

    fn marriage_windows_for_year(&self, year: i32) -> Vec<MarriageSeasonWindow> {
        MARRIAGE_SEASONS
            .iter()
            .filter_map(|spec| {
                let start = NaiveDate::from_ymd_opt(year, spec.start_month, 1)?;
                let end = last_day_of_month(year, spec.end_month);
                Some(MarriageSeasonWindow {
                    season: spec.season.to_string(),
                    start,
                    end,
                    uplift_pct: spec.uplift_pct,
                    colours: spec.colours.iter().map(|c| c.to_string()).collect(),
                    vehicle_kinds: spec.vehicle_kinds.iter().map(|k| k.to_string()).collect(),
                })
            })
            .collect()
    }
}
