//! Conversion-funnel aggregation.

use crate::analyzers::types::FunnelAggregate;
use crate::analyzers::utility::percent;
use crate::record::{EnrichedRecord, Segment};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Default)]
struct StageSums {
    started: u64,
    completed: u64,
    approved: u64,
    purchased: u64,
}

/// Groups enriched rows by `segment`, sums the four stage indicators per
/// group, and derives the conversion ratios.
///
/// Output is sorted by segment value so identical inputs always produce
/// identical tables. Grouping by [`Segment::Overall`] yields a single row
/// equal to the unsegmented aggregate.
pub fn funnel_by_segment(rows: &[EnrichedRecord], segment: Segment) -> Vec<FunnelAggregate> {
    let mut groups: BTreeMap<&str, StageSums> = BTreeMap::new();

    for row in rows {
        let sums = groups.entry(segment.value(row)).or_default();
        sums.started += u64::from(row.started);
        sums.completed += u64::from(row.completed);
        sums.approved += u64::from(row.approved);
        sums.purchased += u64::from(row.purchased);
    }

    debug!(segment = %segment, groups = groups.len(), "Funnel aggregation");

    groups
        .into_iter()
        .map(|(value, sums)| FunnelAggregate {
            segment: value.to_string(),
            started: sums.started,
            completed: sums.completed,
            approved: sums.approved,
            purchased: sums.purchased,
            app_completion_rate: percent(sums.completed, sums.started),
            approval_rate: percent(sums.approved, sums.completed),
            purchase_rate: percent(sums.purchased, sums.approved),
            conversion_rate: percent(sums.purchased, sums.started),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(lead_source: &str, completed: u32, approved: u32, purchased: u32) -> EnrichedRecord {
        EnrichedRecord {
            record_id: "r".to_string(),
            product_type: "Term Life".to_string(),
            user_gender: "F".to_string(),
            lead_source: lead_source.to_string(),
            age_bucket: "31-35".to_string(),
            premium_class: "Standard".to_string(),
            started: 1,
            completed,
            approved,
            purchased,
            number_of_premiums: 0,
            gross_premiums: 0.0,
            underwriting_profit: 0.0,
            monthly_underwriting_profit: 0.0,
            present_value: 0.0,
        }
    }

    /// Builds 100 rows: 80 completed, 60 approved, 40 purchased.
    fn hundred_rows() -> Vec<EnrichedRecord> {
        (0..100)
            .map(|i| {
                row(
                    "Direct",
                    u32::from(i < 80),
                    u32::from(i < 60),
                    u32::from(i < 40),
                )
            })
            .collect()
    }

    #[test]
    fn test_funnel_rates_known_scenario() {
        let table = funnel_by_segment(&hundred_rows(), Segment::Overall);
        assert_eq!(table.len(), 1);
        let agg = &table[0];
        assert_eq!(agg.segment, "overall");
        assert_eq!(
            (agg.started, agg.completed, agg.approved, agg.purchased),
            (100, 80, 60, 40)
        );
        assert_eq!(agg.app_completion_rate, Some(80.0));
        assert_eq!(agg.approval_rate, Some(75.0));
        assert!((agg.purchase_rate.unwrap() - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(agg.conversion_rate, Some(40.0));
    }

    #[test]
    fn test_zero_denominator_is_flagged_undefined() {
        // Nobody completed, so approval_rate has an empty denominator.
        let rows = vec![row("SEO", 0, 0, 0), row("SEO", 0, 0, 0)];
        let table = funnel_by_segment(&rows, Segment::LeadSource);
        let agg = &table[0];
        assert_eq!(agg.app_completion_rate, Some(0.0));
        assert_eq!(agg.approval_rate, None);
        assert_eq!(agg.purchase_rate, None);
        assert_eq!(agg.conversion_rate, Some(0.0));
    }

    #[test]
    fn test_groups_split_by_segment_value() {
        let rows = vec![
            row("Direct", 1, 1, 1),
            row("Direct", 1, 0, 0),
            row("Other", 0, 0, 0),
        ];
        let table = funnel_by_segment(&rows, Segment::LeadSource);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].segment, "Direct");
        assert_eq!(table[0].started, 2);
        assert_eq!(table[0].purchased, 1);
        assert_eq!(table[1].segment, "Other");
        assert_eq!(table[1].started, 1);
    }

    #[test]
    fn test_overall_matches_sum_of_segments() {
        let rows = vec![
            row("Direct", 1, 1, 1),
            row("SEO", 1, 1, 0),
            row("Other", 0, 0, 0),
        ];
        let overall = funnel_by_segment(&rows, Segment::Overall);
        let by_source = funnel_by_segment(&rows, Segment::LeadSource);

        let started: u64 = by_source.iter().map(|a| a.started).sum();
        let purchased: u64 = by_source.iter().map(|a| a.purchased).sum();
        assert_eq!(overall[0].started, started);
        assert_eq!(overall[0].purchased, purchased);
    }

    #[test]
    fn test_rates_stay_in_bounds() {
        let table = funnel_by_segment(&hundred_rows(), Segment::Overall);
        let agg = &table[0];
        for rate in [
            agg.app_completion_rate,
            agg.approval_rate,
            agg.purchase_rate,
            agg.conversion_rate,
        ] {
            let r = rate.unwrap();
            assert!((0.0..=100.0).contains(&r), "rate out of bounds: {r}");
        }
    }
}
