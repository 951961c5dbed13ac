//! Validation error taxonomy.
//!
//! Validation failures are fatal for the dataset and are reported with the
//! offending column and record identity before enrichment runs. Division by
//! zero during ratio derivation is not an error; aggregates carry an explicit
//! undefined marker (`None`) instead.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("required column `{0}` is missing from the input")]
    MissingColumn(String),

    #[error("record `{record_id}`: null value in non-nullable column `{column}`")]
    NullValue { record_id: String, column: String },

    #[error(
        "record `{record_id}`: `{column}` value {value} is outside the allowed range [{min}, {max}]"
    )]
    OutOfRange {
        record_id: String,
        column: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("record `{record_id}`: `{column}` must be a non-negative number, got {value}")]
    InvalidAmount {
        record_id: String,
        column: String,
        value: f64,
    },

    #[error("record `{record_id}`: completed application is missing `{column}`")]
    MissingAmount { record_id: String, column: String },

    #[error("record `{record_id}`: dates are out of order ({detail})")]
    NonMonotonicDates { record_id: String, detail: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
