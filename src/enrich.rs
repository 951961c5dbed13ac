//! Row-level feature derivation.
//!
//! Turns validated application records into enriched rows carrying funnel
//! stage indicators, premium totals, and the discounted present value of the
//! underwriting cash-flow stream. Rows are independent, so the map runs in
//! parallel.

use crate::config::PipelineConfig;
use crate::error::ValidationError;
use crate::record::{ApplicationRecord, EnrichedRecord};
use rayon::prelude::*;
use tracing::debug;

/// Enriches every record in parallel.
///
/// Expects a validated record set; out-of-range ages that slipped past
/// validation are still surfaced as errors rather than silently coerced.
pub fn enrich(
    records: &[ApplicationRecord],
    config: &PipelineConfig,
) -> Result<Vec<EnrichedRecord>, ValidationError> {
    let rows = records
        .par_iter()
        .map(|record| enrich_record(record, config))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(rows = rows.len(), "Enrichment complete");
    Ok(rows)
}

fn enrich_record(
    record: &ApplicationRecord,
    config: &PipelineConfig,
) -> Result<EnrichedRecord, ValidationError> {
    let age = record.user_age.unwrap_or(f64::NAN);
    let age_bucket = config.age_bins.bucket(age).ok_or_else(|| {
        ValidationError::OutOfRange {
            record_id: record.record_id.clone(),
            column: "User Age".to_string(),
            value: age,
            min: config.age_bins.min(),
            max: config.age_bins.max(),
        }
    })?;

    let completed = u32::from(record.application_complete_date.is_some());
    let approved = u32::from(record.approval_decision.as_deref() == Some("Approved"));
    let purchased = u32::from(record.policy_purchase_date.is_some());

    let policy_length_years = record.policy_length_years.unwrap_or(0.0);
    let monthly_premium = record.monthly_premium.unwrap_or(0.0);

    let (number_of_premiums, gross_premiums) = if completed == 1 {
        (
            (policy_length_years * 12.0).floor() as u32,
            policy_length_years * monthly_premium * 12.0,
        )
    } else {
        (0, 0.0)
    };

    let underwriting_profit = gross_premiums * config.underwriting_margin;
    let monthly_underwriting_profit = monthly_premium * config.underwriting_margin;

    // PV covers the full scheduled premium stream of every completed
    // application, purchased or not; conversion is applied at aggregation.
    let present_value = if completed == 1 && number_of_premiums > 0 {
        present_value(
            monthly_underwriting_profit,
            number_of_premiums,
            config.discount_rate,
        )
    } else {
        0.0
    };

    Ok(EnrichedRecord {
        record_id: record.record_id.clone(),
        product_type: record.product_type.clone().unwrap_or_default(),
        user_gender: record.user_gender.clone().unwrap_or_default(),
        lead_source: collapse_lead_source(
            record.lead_source.as_deref(),
            &config.lead_source_allow_list,
        ),
        age_bucket: age_bucket.to_string(),
        premium_class: record
            .premium_class
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        started: 1,
        completed,
        approved,
        purchased,
        number_of_premiums,
        gross_premiums,
        underwriting_profit,
        monthly_underwriting_profit,
        present_value,
    })
}

/// Discounted present value of `n` monthly cash flows of `monthly_profit`,
/// discounted at `annual_rate / 12` per month. Returns 0 for an empty stream.
pub fn present_value(monthly_profit: f64, n: u32, annual_rate: f64) -> f64 {
    let monthly_rate = 1.0 + annual_rate / 12.0;
    (1..=n)
        .map(|i| monthly_profit / monthly_rate.powi(i as i32))
        .sum()
}

/// Collapses any lead source outside the allow-list (including null) to
/// "Other".
pub fn collapse_lead_source(value: Option<&str>, allow_list: &[String]) -> String {
    match value {
        Some(v) if allow_list.iter().any(|a| a == v) => v.to_string(),
        _ => "Other".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(completed: bool, length_years: f64, premium: f64) -> ApplicationRecord {
        ApplicationRecord {
            record_id: "r1".to_string(),
            application_start_date: NaiveDate::from_ymd_opt(2023, 3, 1),
            product_type: Some("Whole Life".to_string()),
            user_age: Some(42.0),
            user_gender: Some("M".to_string()),
            application_complete_date: completed.then(|| NaiveDate::from_ymd_opt(2023, 3, 4).unwrap()),
            approval_decision: completed.then(|| "Approved".to_string()),
            policy_purchase_date: None,
            policy_length_years: Some(length_years),
            monthly_premium: Some(premium),
            lead_source: Some("SEO".to_string()),
            premium_class: Some("Preferred".to_string()),
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    #[test]
    fn test_incomplete_application_has_no_pv_or_premiums() {
        let rows = enrich(&[record(false, 10.0, 100.0)], &config()).unwrap();
        let row = &rows[0];
        assert_eq!(row.completed, 0);
        assert_eq!(row.number_of_premiums, 0);
        assert_eq!(row.gross_premiums, 0.0);
        assert_eq!(row.present_value, 0.0);
    }

    #[test]
    fn test_zero_length_policy_has_zero_pv() {
        let rows = enrich(&[record(true, 0.0, 100.0)], &config()).unwrap();
        let row = &rows[0];
        assert_eq!(row.completed, 1);
        assert_eq!(row.number_of_premiums, 0);
        assert_eq!(row.present_value, 0.0);
    }

    #[test]
    fn test_premium_count_floors_fractional_years() {
        let rows = enrich(&[record(true, 1.25, 100.0)], &config()).unwrap();
        assert_eq!(rows[0].number_of_premiums, 15);
    }

    #[test]
    fn test_gross_premiums_and_margin() {
        let rows = enrich(&[record(true, 10.0, 100.0)], &config()).unwrap();
        let row = &rows[0];
        assert_eq!(row.gross_premiums, 12_000.0);
        assert!((row.underwriting_profit - 360.0).abs() < 1e-9);
        assert!((row.monthly_underwriting_profit - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_pv_known_scenario() {
        // margin 0.03, annual rate 0.12, premium 100, 1 year of premiums:
        // monthly profit 3.0 discounted at 1% per month over 12 months.
        let config = PipelineConfig {
            discount_rate: 0.12,
            ..PipelineConfig::default()
        };
        let rows = enrich(&[record(true, 1.0, 100.0)], &config).unwrap();
        let row = &rows[0];
        assert!((row.monthly_underwriting_profit - 3.0).abs() < 1e-9);
        assert!(
            (row.present_value - 33.85).abs() < 0.01,
            "pv = {}",
            row.present_value
        );
    }

    #[test]
    fn test_pv_decreases_with_discount_rate() {
        let low = present_value(3.0, 12, 0.05);
        let mid = present_value(3.0, 12, 0.10);
        let high = present_value(3.0, 12, 0.20);
        assert!(low > mid && mid > high);
    }

    #[test]
    fn test_pv_empty_stream_is_zero() {
        assert_eq!(present_value(3.0, 0, 0.10), 0.0);
    }

    #[test]
    fn test_lead_source_collapsing() {
        let allow = PipelineConfig::default().lead_source_allow_list;
        assert_eq!(collapse_lead_source(Some("TikTok Ads"), &allow), "Other");
        assert_eq!(collapse_lead_source(Some("Direct"), &allow), "Direct");
        assert_eq!(collapse_lead_source(None, &allow), "Other");
    }

    #[test]
    fn test_age_bucket_assigned() {
        let mut input = record(true, 1.0, 50.0);
        input.user_age = Some(34.0);
        let rows = enrich(&[input], &config()).unwrap();
        assert_eq!(rows[0].age_bucket, "31-35");
    }

    #[test]
    fn test_not_approved_decision() {
        let mut input = record(true, 1.0, 50.0);
        input.approval_decision = Some("Declined".to_string());
        let rows = enrich(&[input], &config()).unwrap();
        assert_eq!(rows[0].approved, 0);
    }

    #[test]
    fn test_out_of_range_age_is_an_error() {
        let mut input = record(true, 1.0, 50.0);
        input.user_age = Some(250.0);
        assert!(enrich(&[input], &config()).is_err());
    }
}
