//! Present-value and optimal-CAC aggregation.
//!
//! PV is computed per row over the full scheduled premium stream of every
//! completed application; multiplying by the segment conversion rate here
//! turns it into an expected value per application started, from which the
//! acquisition spend ceiling falls out of the target LTV:CAC multiple.

use crate::analyzers::types::ValueAggregate;
use crate::analyzers::utility::fraction;
use crate::config::PipelineConfig;
use crate::record::{EnrichedRecord, Segment};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Default)]
struct ValueSums {
    started: u64,
    completed: u64,
    purchased: u64,
    total_pv: f64,
}

/// Groups enriched rows by `segment` and derives per-group PV economics.
///
/// Output is sorted by segment value. Mean PV is per completed application
/// and undefined for groups with none; every ratio derived from an undefined
/// input stays undefined.
pub fn value_by_segment(
    rows: &[EnrichedRecord],
    segment: Segment,
    config: &PipelineConfig,
) -> Vec<ValueAggregate> {
    let mut groups: BTreeMap<&str, ValueSums> = BTreeMap::new();

    for row in rows {
        let sums = groups.entry(segment.value(row)).or_default();
        sums.started += u64::from(row.started);
        sums.completed += u64::from(row.completed);
        sums.purchased += u64::from(row.purchased);
        sums.total_pv += row.present_value;
    }

    debug!(segment = %segment, groups = groups.len(), "Value aggregation");

    groups
        .into_iter()
        .map(|(value, sums)| {
            let mean_pv = if sums.completed == 0 {
                None
            } else {
                Some(sums.total_pv / sums.completed as f64)
            };
            let conversion_rate = fraction(sums.purchased, sums.started);

            let expected_pv_per_app =
                mean_pv.zip(conversion_rate).map(|(pv, conv)| pv * conv);
            let expected_total_pv = conversion_rate.map(|conv| sums.total_pv * conv);
            let optimal_cac_per_app =
                expected_pv_per_app.map(|e| e / config.ltv_cac_ratio);
            let optimal_cac_of_segment =
                optimal_cac_per_app.map(|cac| cac * sums.started as f64);
            let total_expected_profit = expected_total_pv
                .zip(optimal_cac_of_segment)
                .map(|(pv, cac)| pv - cac);

            ValueAggregate {
                segment: value.to_string(),
                applications: sums.started,
                completed: sums.completed,
                purchased: sums.purchased,
                mean_pv,
                total_pv: sums.total_pv,
                conversion_rate,
                expected_pv_per_app,
                expected_total_pv,
                optimal_cac_per_app,
                optimal_cac_of_segment,
                total_expected_profit,
            }
        })
        .collect()
}
