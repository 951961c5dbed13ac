//! CSV input collaborator.
//!
//! Reads application records from disk and validates them before enrichment.
//! Validation collects every problem it finds so a bad export is reported in
//! one pass rather than one error per run.

use crate::config::PipelineConfig;
use crate::error::ValidationError;
use crate::record::{ApplicationRecord, REQUIRED_COLUMNS};
use anyhow::Result;
use std::fs::File;
use tracing::debug;

/// Reads application records from a CSV file.
///
/// The header row is checked against [`REQUIRED_COLUMNS`] before any row is
/// deserialized; a missing column is reported as a structured
/// [`ValidationError`] instead of a row-level parse failure.
pub fn read_applications(path: &str) -> Result<Vec<ApplicationRecord>> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(ValidationError::MissingColumn(column.to_string()).into());
        }
    }

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: ApplicationRecord = result?;
        records.push(record);
    }

    debug!(path, rows = records.len(), "Applications loaded");
    Ok(records)
}

/// Validates a record set against the pipeline's input contract.
///
/// Returns every violation found; an empty vector means the dataset is safe
/// to enrich. Checks: non-null identity/start-date/product/age/gender, age
/// within the configured bin range, monotonic dates, and non-negative finite
/// premium terms on completed applications.
pub fn validate(records: &[ApplicationRecord], config: &PipelineConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Err(e) = config.check() {
        errors.push(e);
        return errors;
    }

    for record in records {
        validate_record(record, config, &mut errors);
    }

    errors
}

fn validate_record(
    record: &ApplicationRecord,
    config: &PipelineConfig,
    errors: &mut Vec<ValidationError>,
) {
    let id = record.record_id.trim();
    if id.is_empty() {
        errors.push(ValidationError::NullValue {
            record_id: "<unknown>".to_string(),
            column: "Record ID".to_string(),
        });
        return;
    }

    let null_value = |column: &str| ValidationError::NullValue {
        record_id: id.to_string(),
        column: column.to_string(),
    };

    if record.application_start_date.is_none() {
        errors.push(null_value("Application Start Date"));
    }
    if record.product_type.as_deref().unwrap_or("").trim().is_empty() {
        errors.push(null_value("Product Type"));
    }
    if record.user_gender.as_deref().unwrap_or("").trim().is_empty() {
        errors.push(null_value("User Gender"));
    }

    match record.user_age {
        None => errors.push(null_value("User Age")),
        Some(age) if !age.is_finite() || config.age_bins.bucket(age).is_none() => {
            errors.push(ValidationError::OutOfRange {
                record_id: id.to_string(),
                column: "User Age".to_string(),
                value: age,
                min: config.age_bins.min(),
                max: config.age_bins.max(),
            });
        }
        Some(_) => {}
    }

    // Dates must be monotonic: start <= complete <= purchase.
    if let (Some(start), Some(complete)) =
        (record.application_start_date, record.application_complete_date)
        && complete < start
    {
        errors.push(ValidationError::NonMonotonicDates {
            record_id: id.to_string(),
            detail: format!("completed {complete} before started {start}"),
        });
    }
    if let (Some(complete), Some(purchase)) =
        (record.application_complete_date, record.policy_purchase_date)
        && purchase < complete
    {
        errors.push(ValidationError::NonMonotonicDates {
            record_id: id.to_string(),
            detail: format!("purchased {purchase} before completed {complete}"),
        });
    }

    // Premium terms only matter once the application is completed.
    if record.application_complete_date.is_some() {
        check_amount(
            id,
            "Policy Length (Years)",
            record.policy_length_years,
            errors,
        );
        check_amount(id, "Policy Monthly Premiums", record.monthly_premium, errors);
    }
}

fn check_amount(id: &str, column: &str, value: Option<f64>, errors: &mut Vec<ValidationError>) {
    match value {
        None => errors.push(ValidationError::MissingAmount {
            record_id: id.to_string(),
            column: column.to_string(),
        }),
        Some(v) if !v.is_finite() || v < 0.0 => errors.push(ValidationError::InvalidAmount {
            record_id: id.to_string(),
            column: column.to_string(),
            value: v,
        }),
        Some(_) => {}
    }
}
