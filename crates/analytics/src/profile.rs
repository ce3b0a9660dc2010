//! Per-SKU seasonal profiles and trend factors.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use dispatchiq_core::{DatasetSnapshot, Sku};

/// Months of history below which a SKU gets a flat seasonal profile.
const MIN_DISTINCT_MONTHS: usize = 3;

/// Trend factor clamp. YoY extremes in the raw data are almost always upload
/// artefacts (partial first/last years).
const TREND_CLAMP: (f64, f64) = (0.8, 1.3);

/// Per-SKU, per-calendar-month totals. Derived, always rebuilt from snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub year: i32,
    pub month: u32,
    pub units: u64,
    pub revenue: f64,
}

/// Twelve month-of-year factors whose unweighted mean is 1.0.
///
/// A factor above 1.0 marks a month that historically outsells the SKU's
/// average month; applying the profile to a de-seasonalised base reproduces
/// the historical level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalProfile([f64; 12]);

impl SeasonalProfile {
    /// All factors 1.0 (used when history is too thin to estimate shape).
    pub fn flat() -> Self {
        Self([1.0; 12])
    }

    /// Build from raw factors, renormalising so the twelve average to 1.0.
    pub fn normalised(factors: [f64; 12]) -> Self {
        let mean = factors.iter().sum::<f64>() / 12.0;
        if mean <= f64::EPSILON {
            return Self::flat();
        }
        Self(factors.map(|f| f / mean))
    }

    /// Factor for a calendar month (1-12).
    pub fn factor_for(&self, month: u32) -> f64 {
        debug_assert!((1..=12).contains(&month));
        self.0[(month.clamp(1, 12) - 1) as usize]
    }

    pub fn factors(&self) -> &[f64; 12] {
        &self.0
    }

    pub fn is_flat(&self) -> bool {
        self.0.iter().all(|f| (f - 1.0).abs() < 1e-9)
    }
}

/// Everything the forecast engine needs to know about one SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuProfile {
    pub code: String,
    pub sku: Sku,
    pub seasonal: SeasonalProfile,
    /// Extrapolated year-over-year growth multiplier. 1.0 when fewer than two
    /// calendar years of history exist.
    pub yoy_trend_factor: f64,
    /// Trailing units per day over the SKU's full history span.
    pub base_daily_avg: f64,
    pub avg_unit_price: f64,
    pub first_sale: NaiveDate,
    pub last_sale: NaiveDate,
    pub monthly: Vec<MonthlyAggregate>,
    pub distinct_months: usize,
}

/// Profiles for every SKU in a snapshot, keyed by identity with a code index.
#[derive(Debug, Clone, Default)]
pub struct SkuProfiles {
    profiles: HashMap<Sku, SkuProfile>,
    by_code: HashMap<String, Sku>,
}

impl SkuProfiles {
    pub fn get(&self, sku: &Sku) -> Option<&SkuProfile> {
        self.profiles.get(sku)
    }

    pub fn get_by_code(&self, code: &str) -> Option<&SkuProfile> {
        self.by_code.get(code).and_then(|sku| self.profiles.get(sku))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkuProfile> {
        self.profiles.values()
    }

    /// Profiles in a stable order (by code), for deterministic batch output.
    pub fn iter_sorted(&self) -> Vec<&SkuProfile> {
        let mut profiles: Vec<&SkuProfile> = self.profiles.values().collect();
        profiles.sort_by(|a, b| a.code.cmp(&b.code));
        profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Builds [`SkuProfiles`] from a sales snapshot.
pub struct SeasonalProfileBuilder;

impl SeasonalProfileBuilder {
    pub fn build(snapshot: &DatasetSnapshot) -> SkuProfiles {
        let mut grouped: HashMap<Sku, Vec<&dispatchiq_core::SalesRecord>> = HashMap::new();
        for record in snapshot.sales() {
            grouped.entry(record.sku.clone()).or_default().push(record);
        }

        let mut profiles = SkuProfiles::default();
        for (sku, records) in grouped {
            let profile = Self::build_one(&sku, &records);
            profiles.by_code.insert(profile.code.clone(), sku.clone());
            profiles.profiles.insert(sku, profile);
        }
        profiles
    }

    fn build_one(sku: &Sku, records: &[&dispatchiq_core::SalesRecord]) -> SkuProfile {
        // Records arrive date-ascending from the snapshot.
        let code = records[0].sku_code.clone();
        let first_sale = records[0].date;
        let last_sale = records[records.len() - 1].date;

        let mut monthly_map: BTreeMap<(i32, u32), (u64, f64)> = BTreeMap::new();
        let mut total_units: u64 = 0;
        let mut price_sum = 0.0;
        for record in records {
            let key = (record.date.year(), record.date.month());
            let entry = monthly_map.entry(key).or_insert((0, 0.0));
            entry.0 += u64::from(record.quantity);
            entry.1 += record.revenue();
            total_units += u64::from(record.quantity);
            price_sum += record.unit_price;
        }

        let monthly: Vec<MonthlyAggregate> = monthly_map
            .iter()
            .map(|(&(year, month), &(units, revenue))| MonthlyAggregate {
                year,
                month,
                units,
                revenue,
            })
            .collect();

        let span_days = (last_sale - first_sale).num_days().max(0) + 1;
        let base_daily_avg = total_units as f64 / span_days as f64;
        let avg_unit_price = price_sum / records.len() as f64;

        SkuProfile {
            code,
            sku: sku.clone(),
            seasonal: Self::seasonal_profile(&monthly),
            yoy_trend_factor: Self::trend_factor(&monthly),
            base_daily_avg,
            avg_unit_price,
            first_sale,
            last_sale,
            distinct_months: monthly.len(),
            monthly,
        }
    }

    /// Month-of-year factors: mean units of each calendar month across years,
    /// over the overall monthly mean, renormalised to average 1.0. Months
    /// with no history sit at the neutral factor.
    fn seasonal_profile(monthly: &[MonthlyAggregate]) -> SeasonalProfile {
        if monthly.len() < MIN_DISTINCT_MONTHS {
            return SeasonalProfile::flat();
        }

        let mut sums = [0.0_f64; 12];
        let mut counts = [0_u32; 12];
        for aggregate in monthly {
            let idx = (aggregate.month - 1) as usize;
            sums[idx] += aggregate.units as f64;
            counts[idx] += 1;
        }

        let month_means: Vec<f64> = (0..12)
            .filter(|&i| counts[i] > 0)
            .map(|i| sums[i] / f64::from(counts[i]))
            .collect();
        let overall = month_means.iter().sum::<f64>() / month_means.len() as f64;
        if overall <= f64::EPSILON {
            return SeasonalProfile::flat();
        }

        let mut factors = [1.0_f64; 12];
        for i in 0..12 {
            if counts[i] > 0 {
                factors[i] = (sums[i] / f64::from(counts[i])) / overall;
            }
        }
        SeasonalProfile::normalised(factors)
    }

    /// YoY trend: slope of annual totals between the first and last calendar
    /// years, expressed as a one-period-ahead multiplier. Fewer than two
    /// calendar years of history collapses to exactly 1.0 (no extrapolation).
    fn trend_factor(monthly: &[MonthlyAggregate]) -> f64 {
        let mut annual: BTreeMap<i32, u64> = BTreeMap::new();
        for aggregate in monthly {
            *annual.entry(aggregate.year).or_insert(0) += aggregate.units;
        }
        if annual.len() < 2 {
            return 1.0;
        }

        let (&first_year, &first_units) = annual.iter().next().unwrap_or((&0, &0));
        let (&last_year, &last_units) = annual.iter().next_back().unwrap_or((&0, &0));
        let year_span = f64::from(last_year - first_year);
        if year_span <= 0.0 {
            return 1.0;
        }
        let slope = (last_units as f64 - first_units as f64) / year_span;
        let trend = 1.0 + slope / (first_units as f64).max(1.0);
        trend.clamp(TREND_CLAMP.0, TREND_CLAMP.1)
    }
}
