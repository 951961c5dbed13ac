//! Display formatting for the value table.
//!
//! Pure presentation transform: the numeric [`ValueAggregate`] table stays
//! canonical, this layer renders report-ready strings with percentage signs
//! and thousands separators. Undefined cells render as "n/a".

use crate::analyzers::types::ValueAggregate;
use serde::Serialize;

/// A display-formatted value row using the report column names.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FormattedValueRow {
    #[serde(rename = "Segment")]
    pub segment: String,
    #[serde(rename = "Number of Apps")]
    pub number_of_apps: u64,
    #[serde(rename = "Policies Purchased")]
    pub policies_purchased: u64,
    #[serde(rename = "Conversion Rate")]
    pub conversion_rate: String,
    #[serde(rename = "PV per Policy")]
    pub pv_per_policy: String,
    #[serde(rename = "Expected PV per App")]
    pub expected_pv_per_app: String,
    #[serde(rename = "Expected PV of Segment")]
    pub expected_pv_of_segment: String,
    #[serde(rename = "Optimal CAC per App")]
    pub optimal_cac_per_app: String,
    #[serde(rename = "Optimal CAC of Segment")]
    pub optimal_cac_of_segment: String,
    #[serde(rename = "Total Expected Profit of Segment")]
    pub total_expected_profit: String,
}

/// Formats a numeric value table for display.
pub fn format_value_table(rows: &[ValueAggregate]) -> Vec<FormattedValueRow> {
    rows.iter()
        .map(|row| FormattedValueRow {
            segment: row.segment.clone(),
            number_of_apps: row.applications,
            policies_purchased: row.purchased,
            conversion_rate: percent_cell(row.conversion_rate),
            pv_per_policy: money_cell(row.mean_pv),
            expected_pv_per_app: money_cell(row.expected_pv_per_app),
            expected_pv_of_segment: money_cell(row.expected_total_pv),
            optimal_cac_per_app: money_cell(row.optimal_cac_per_app),
            optimal_cac_of_segment: money_cell(row.optimal_cac_of_segment),
            total_expected_profit: money_cell(row.total_expected_profit),
        })
        .collect()
}

fn percent_cell(value: Option<f64>) -> String {
    match value {
        Some(fraction) => format!("{:.2}%", fraction * 100.0),
        None => "n/a".to_string(),
    }
}

fn money_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => thousands(v),
        None => "n/a".to_string(),
    }
}

/// Renders a number with two decimals and comma thousands separators.
pub fn thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, f),
        None => (formatted.as_str(), "00"),
    };

    let mut grouped = String::new();
    let digits = int_part.len();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && (value.abs() >= 0.005) { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}
