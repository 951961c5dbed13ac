//! Application record schema.
//!
//! The raw row mirrors the warehouse export column-for-column; the enriched
//! row carries the derived features the aggregations consume. Columns are
//! named, typed fields rather than string lookups.

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A single raw row deserialized from an application-pipeline CSV export.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationRecord {
    #[serde(rename = "Record ID")]
    pub record_id: String,
    #[serde(rename = "Application Start Date")]
    pub application_start_date: Option<NaiveDate>,
    #[serde(rename = "Product Type")]
    pub product_type: Option<String>,
    #[serde(rename = "User Age")]
    pub user_age: Option<f64>,
    #[serde(rename = "User Gender")]
    pub user_gender: Option<String>,
    #[serde(rename = "Application Complete Date")]
    pub application_complete_date: Option<NaiveDate>,
    #[serde(rename = "Application Approval Decision")]
    pub approval_decision: Option<String>,
    #[serde(rename = "Policy Purchase Date")]
    pub policy_purchase_date: Option<NaiveDate>,
    #[serde(rename = "Policy Length (Years)")]
    pub policy_length_years: Option<f64>,
    #[serde(rename = "Policy Monthly Premiums")]
    pub monthly_premium: Option<f64>,
    #[serde(rename = "Lead Source")]
    pub lead_source: Option<String>,
    #[serde(rename = "Premium Class")]
    pub premium_class: Option<String>,
}

/// Column headers that must be present in the input, whether or not every
/// cell carries a value.
pub static REQUIRED_COLUMNS: &[&str] = &[
    "Record ID",
    "Application Start Date",
    "Product Type",
    "User Age",
    "User Gender",
    "Application Complete Date",
    "Application Approval Decision",
    "Policy Purchase Date",
    "Policy Length (Years)",
    "Policy Monthly Premiums",
    "Lead Source",
    "Premium Class",
];

/// One enriched row: the validated record plus every derived feature the
/// funnel and value aggregations need.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedRecord {
    pub record_id: String,
    pub product_type: String,
    pub user_gender: String,
    /// Lead source after allow-list collapsing.
    pub lead_source: String,
    /// Age bin label the user falls into.
    pub age_bucket: String,
    pub premium_class: String,

    // funnel stage indicators
    pub started: u32,
    pub completed: u32,
    pub approved: u32,
    pub purchased: u32,

    pub number_of_premiums: u32,
    pub gross_premiums: f64,
    pub underwriting_profit: f64,
    pub monthly_underwriting_profit: f64,
    pub present_value: f64,
}

/// Partition key for the group-by aggregations. `Overall` is synthetic and
/// constant across all rows, giving the whole-portfolio view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Overall,
    LeadSource,
    AgeBucket,
    Gender,
    ProductType,
    PremiumClass,
}

impl Segment {
    /// Segment value of an enriched record.
    pub fn value<'a>(&self, record: &'a EnrichedRecord) -> &'a str {
        match self {
            Segment::Overall => "overall",
            Segment::LeadSource => &record.lead_source,
            Segment::AgeBucket => &record.age_bucket,
            Segment::Gender => &record.user_gender,
            Segment::ProductType => &record.product_type,
            Segment::PremiumClass => &record.premium_class,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Overall => "overall",
            Segment::LeadSource => "lead_source",
            Segment::AgeBucket => "age_bucket",
            Segment::Gender => "gender",
            Segment::ProductType => "product_type",
            Segment::PremiumClass => "premium_class",
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
