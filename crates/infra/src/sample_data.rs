//! Deterministic demo dataset: four years (2021-2024) of Hero two-wheeler
//! sales with festive and marriage seasonality, YoY growth and a 15-SKU mix.
//!
//! Seeded RNG, so every call produces the identical snapshot contents (the
//! snapshot version differs per build, nothing else does).

use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dispatchiq_core::{DatasetSnapshot, SalesRecord, Sku};

const RNG_SEED: u64 = 42;

struct SkuSeed {
    code: &'static str,
    model: &'static str,
    variant: &'static str,
    colour: &'static str,
    price: f64,
    base_daily: f64,
    region: &'static str,
}

const HERO_SKUS: &[SkuSeed] = &[
    SkuSeed { code: "HER-SPL-STD-BLK", model: "Splendor Plus", variant: "Standard", colour: "Black", price: 72_000.0, base_daily: 4.5, region: "North India" },
    SkuSeed { code: "HER-SPL-STD-RED", model: "Splendor Plus", variant: "Standard", colour: "Sports Red", price: 72_000.0, base_daily: 3.8, region: "North India" },
    SkuSeed { code: "HER-SPL-DLX-SIL", model: "Splendor Plus", variant: "Deluxe", colour: "Pearl Silver", price: 76_000.0, base_daily: 3.2, region: "North India" },
    SkuSeed { code: "HER-HFD-STD-BLK", model: "HF Deluxe", variant: "Standard", colour: "Black", price: 64_000.0, base_daily: 5.0, region: "All India" },
    SkuSeed { code: "HER-HFD-STD-RED", model: "HF Deluxe", variant: "Standard", colour: "Red", price: 64_000.0, base_daily: 4.0, region: "All India" },
    SkuSeed { code: "HER-PAS-STD-BLK", model: "Passion Pro", variant: "Standard", colour: "Black", price: 79_000.0, base_daily: 3.5, region: "All India" },
    SkuSeed { code: "HER-PAS-DLX-RED", model: "Passion Pro", variant: "Deluxe", colour: "Red", price: 82_000.0, base_daily: 2.5, region: "All India" },
    SkuSeed { code: "HER-XTR-STD-RED", model: "Xtreme 160R", variant: "Standard", colour: "Blazing Red", price: 115_000.0, base_daily: 2.0, region: "Urban" },
    SkuSeed { code: "HER-XTR-STD-BLK", model: "Xtreme 160R", variant: "Standard", colour: "Black", price: 115_000.0, base_daily: 1.8, region: "Urban" },
    SkuSeed { code: "HER-DST-STD-WHT", model: "Destini 125", variant: "Standard", colour: "Pearl White", price: 78_000.0, base_daily: 2.8, region: "All India" },
    SkuSeed { code: "HER-DST-STD-RED", model: "Destini 125", variant: "Standard", colour: "Imperial Red", price: 78_000.0, base_daily: 2.5, region: "All India" },
    SkuSeed { code: "HER-MAE-STD-SIL", model: "Maestro Edge 125", variant: "Standard", colour: "Silver", price: 82_000.0, base_daily: 2.0, region: "South India" },
    SkuSeed { code: "HER-GLM-STD-BLU", model: "Glamour", variant: "Standard", colour: "Force Blue", price: 85_000.0, base_daily: 1.5, region: "All India" },
    SkuSeed { code: "HER-XPL-STD-BLK", model: "Xpulse 200", variant: "Standard", colour: "Sports Red", price: 140_000.0, base_daily: 0.8, region: "Urban" },
    SkuSeed { code: "HER-SUP-STD-BLK", model: "Super Splendor", variant: "Standard", colour: "Black", price: 82_000.0, base_daily: 2.2, region: "All India" },
];

/// Monthly demand multipliers for the Indian two-wheeler market, Jan..Dec.
const SEASONAL: [f64; 12] = [
    0.85, 0.92, 1.15, 0.95, 1.00, 0.82, 0.78, 0.95, 1.08, 1.38, 1.52, 1.22,
];

/// (year, month, start_day, end_day, boost).
const FESTIVAL_WINDOWS: &[(i32, u32, u32, u32, f64)] = &[
    (2021, 1, 12, 16, 1.30),
    (2021, 10, 5, 16, 1.40),
    (2021, 11, 1, 7, 1.60),
    (2022, 1, 12, 16, 1.30),
    (2022, 9, 25, 30, 1.20),
    (2022, 10, 1, 6, 1.40),
    (2022, 10, 22, 26, 1.60),
    (2023, 1, 12, 16, 1.30),
    (2023, 4, 20, 24, 1.25),
    (2023, 10, 14, 25, 1.40),
    (2023, 11, 10, 15, 1.60),
    (2024, 1, 13, 17, 1.30),
    (2024, 5, 8, 12, 1.25),
    (2024, 10, 2, 14, 1.40),
    (2024, 10, 28, 31, 1.50),
    (2024, 11, 1, 5, 1.60),
];

fn yoy_growth(year: i32) -> f64 {
    match year {
        2021 => 1.00,
        2022 => 1.08,
        2023 => 1.14,
        2024 => 1.22,
        _ => 1.0,
    }
}

fn festival_boost(date: NaiveDate) -> f64 {
    for &(year, month, start_day, end_day, boost) in FESTIVAL_WINDOWS {
        if date.year() == year
            && date.month() == month
            && (start_day..=end_day).contains(&date.day())
        {
            return boost;
        }
    }
    1.0
}

fn marriage_uplift(date: NaiveDate) -> f64 {
    match date.month() {
        11 | 12 => 1.25,
        2..=5 => 1.20,
        _ => 1.0,
    }
}

fn location(region: &str) -> Option<String> {
    let city = match region {
        r if r.contains("North") => "Delhi",
        r if r.contains("South") => "Chennai",
        "Urban" => "Mumbai",
        _ => "Pan India",
    };
    Some(city.to_string())
}

/// The full four-year demo sales history, ~18k rows.
pub fn sample_sales() -> Vec<SalesRecord> {
    let mut rng = StdRng::seed_from_u64(RNG_SEED);
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or_default();
    let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default();

    let mut records = Vec::new();
    let mut date = start;
    while date <= end {
        let yoy = yoy_growth(date.year());
        for seed in HERO_SKUS {
            let noise: f64 = rng.gen_range(0.7..1.3);
            let raw = seed.base_daily
                * SEASONAL[date.month0() as usize]
                * festival_boost(date)
                * marriage_uplift(date)
                * yoy
                * noise;
            let qty = raw.round().max(0.0) as u32;
            if qty == 0 {
                continue;
            }

            // ~3% annual price drift, rounded to the nearest hundred rupees
            let drift = 1.0 + 0.03 * f64::from(date.year() - 2021);
            let price = (seed.price * drift / 100.0).round() * 100.0;

            records.push(SalesRecord {
                sku_code: seed.code.to_string(),
                sku: Sku::new(seed.model, seed.variant, seed.colour),
                date,
                quantity: qty,
                unit_price: price,
                location: location(seed.region),
            });
        }
        date += Duration::days(1);
    }

    tracing::debug!(rows = records.len(), "sample sales generated");
    records
}

/// Demo snapshot with no stock sheet, so stock falls back to estimates.
pub fn sample_snapshot() -> DatasetSnapshot {
    DatasetSnapshot::new(sample_sales(), None)
}
