//! Pipeline configuration.
//!
//! Every tunable of the computation lives here and is passed explicitly into
//! the enrichment and aggregation entry points. Defaults match the standard
//! underwriting assumptions; a JSON file can override any subset of fields.

use crate::error::ValidationError;
use anyhow::Result;
use serde::Deserialize;

/// Age binning scheme: half-open bins `[edges[i], edges[i+1])`, one label per
/// bin. The last bin is closed at its upper edge so the maximum age is
/// bucketable.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgeBins {
    pub edges: Vec<f64>,
    pub labels: Vec<String>,
}

impl Default for AgeBins {
    fn default() -> Self {
        AgeBins {
            edges: vec![0.0, 30.0, 35.0, 40.0, 50.0, 60.0, 100.0],
            labels: ["<30", "31-35", "36-40", "41-50", "51-60", "61+"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AgeBins {
    /// Returns the label of the bin containing `age`, or `None` when `age`
    /// falls outside the configured range.
    pub fn bucket(&self, age: f64) -> Option<&str> {
        let last = self.labels.len().checked_sub(1)?;
        for (i, (edges, label)) in self.edges.windows(2).zip(self.labels.iter()).enumerate() {
            let inside = if i == last {
                age >= edges[0] && age <= edges[1]
            } else {
                age >= edges[0] && age < edges[1]
            };
            if inside {
                return Some(label);
            }
        }
        None
    }

    pub fn min(&self) -> f64 {
        self.edges.first().copied().unwrap_or(0.0)
    }

    pub fn max(&self) -> f64 {
        self.edges.last().copied().unwrap_or(0.0)
    }
}

/// Parameters for enrichment and aggregation.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fraction of gross premium kept as underwriting profit.
    pub underwriting_margin: f64,
    /// Annual discount rate, applied monthly as `rate / 12`.
    pub discount_rate: f64,
    /// Target LTV:CAC multiple used to back into an acquisition spend ceiling.
    pub ltv_cac_ratio: f64,
    /// Lead sources kept as-is; everything else collapses to "Other".
    pub lead_source_allow_list: Vec<String>,
    pub age_bins: AgeBins,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            underwriting_margin: 0.03,
            discount_rate: 0.10,
            ltv_cac_ratio: 3.0,
            lead_source_allow_list: [
                "Facebook Paid",
                "Google Paid",
                "SEO",
                "Affiliate",
                "Direct",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            age_bins: AgeBins::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads overrides from a JSON file at `path`. Fields absent from the
    /// file keep their defaults.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    /// Rejects configurations the computation cannot run against.
    pub fn check(&self) -> Result<(), ValidationError> {
        let bins = &self.age_bins;
        if bins.edges.len() != bins.labels.len() + 1 {
            return Err(ValidationError::InvalidConfig(format!(
                "age_bins needs one more edge than labels, got {} edges and {} labels",
                bins.edges.len(),
                bins.labels.len()
            )));
        }
        if bins.edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ValidationError::InvalidConfig(
                "age_bins edges must be strictly increasing".to_string(),
            ));
        }
        if self.ltv_cac_ratio <= 0.0 {
            return Err(ValidationError::InvalidConfig(format!(
                "ltv_cac_ratio must be positive, got {}",
                self.ltv_cac_ratio
            )));
        }
        Ok(())
    }
}
