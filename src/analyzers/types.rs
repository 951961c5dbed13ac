//! Aggregate row types produced by the funnel and value analyzers.
//!
//! Ratio fields are `Option<f64>`: `None` marks a ratio whose denominator
//! group-sum was zero. It serializes as an empty CSV cell / JSON null rather
//! than propagating NaN downstream.

use serde::Serialize;

/// Funnel stage counts and conversion ratios for one segment value.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FunnelAggregate {
    pub segment: String,

    pub started: u64,
    pub completed: u64,
    pub approved: u64,
    pub purchased: u64,

    /// completed / started, percent.
    pub app_completion_rate: Option<f64>,
    /// approved / completed, percent.
    pub approval_rate: Option<f64>,
    /// purchased / approved, percent.
    pub purchase_rate: Option<f64>,
    /// purchased / started, percent.
    pub conversion_rate: Option<f64>,
}

/// Present-value and optimal-CAC economics for one segment value.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValueAggregate {
    pub segment: String,

    /// Applications started in the segment.
    pub applications: u64,
    pub completed: u64,
    pub purchased: u64,

    /// Mean PV per completed application; undefined when the segment has no
    /// completed applications.
    pub mean_pv: Option<f64>,
    /// Summed PV across the segment.
    pub total_pv: f64,

    /// purchased / started, as a fraction.
    pub conversion_rate: Option<f64>,
    pub expected_pv_per_app: Option<f64>,
    pub expected_total_pv: Option<f64>,
    pub optimal_cac_per_app: Option<f64>,
    pub optimal_cac_of_segment: Option<f64>,
    pub total_expected_profit: Option<f64>,
}
