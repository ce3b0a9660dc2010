//! CSV export of a dispatch plan, one row per recommendation.

use crate::plan::{DispatchPlan, StockSource};

const HEADER: &[&str] = &[
    "SKU Code",
    "Model Name",
    "Variant",
    "Colour",
    "Current Stock (Uploaded)",
    "Stock Source",
    "Forecast Units (Next Period)",
    "Recommended Order Qty",
    "Buffer Stock (15%)",
    "Total Dispatch Qty",
    "Unit Price (₹)",
    "Working Capital Impact (₹)",
    "Festival Boost Factor",
    "Risk Score (%)",
    "Risk Type",
    "Notes",
];

/// Quote a field when it carries a comma, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_row(out: &mut String, fields: &[String]) {
    let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

/// Render the plan in the dealer-facing column layout.
pub fn export_csv(plan: &DispatchPlan) -> String {
    let mut out = String::new();
    write_row(
        &mut out,
        &HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
    );

    for rec in &plan.recommendations {
        let source = match rec.stock_source {
            StockSource::Uploaded => "uploaded",
            StockSource::Estimated => "estimated",
        };
        write_row(
            &mut out,
            &[
                rec.sku_code.clone(),
                rec.sku.model.clone(),
                rec.sku.variant.clone(),
                rec.sku.colour.clone(),
                rec.current_stock.to_string(),
                source.to_string(),
                format!("{:.0}", rec.forecast_units.trunc()),
                rec.recommended_quantity.to_string(),
                rec.buffer_stock.to_string(),
                rec.total_dispatch.to_string(),
                format!("{:.2}", rec.unit_price),
                format!("{:.2}", rec.working_capital_impact),
                format!("{:.2}", rec.festival_factor),
                format!("{:.1}", rec.risk.score * 100.0),
                rec.risk.risk_type.to_string(),
                rec.notes.clone(),
            ],
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::DispatchPlanner;
    use chrono::{Duration, NaiveDate};
    use dispatchiq_calendar::FestivalCalendar;
    use dispatchiq_core::{DatasetSnapshot, SalesRecord, Sku, StockLevel};

    fn sample_plan() -> DispatchPlan {
        let sku = Sku::new("Splendor Plus", "Standard", "Black");
        let mut sales = Vec::new();
        let mut date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        while date <= NaiveDate::from_ymd_opt(2024, 12, 31).unwrap() {
            sales.push(SalesRecord {
                sku_code: "HER-SPL-STD-BLK".to_string(),
                sku: sku.clone(),
                date,
                quantity: 2,
                unit_price: 50_000.0,
                location: None,
            });
            date += Duration::days(1);
        }
        let snapshot = DatasetSnapshot::new(
            sales,
            Some(vec![StockLevel {
                sku_code: "HER-SPL-STD-BLK".to_string(),
                current_stock: 0,
                location: None,
            }]),
        );
        let calendar = FestivalCalendar::builtin();
        DispatchPlanner::plan(
            &snapshot,
            &calendar,
            21,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn header_matches_the_dealer_layout() {
        let csv = export_csv(&sample_plan());
        let first = csv.lines().next().unwrap();
        assert!(first.starts_with("SKU Code,Model Name,Variant,Colour"));
        assert!(first.ends_with("Risk Type,Notes"));
        assert_eq!(first.split(',').count(), 16);
    }

    #[test]
    fn one_row_per_recommendation_with_stable_fields() {
        let plan = sample_plan();
        let csv = export_csv(&plan);
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 1 + plan.recommendations.len());
        assert!(rows[1].starts_with("HER-SPL-STD-BLK,Splendor Plus,Standard,Black,0,uploaded"));
        assert!(rows[1].contains("understock"));
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
