//! Pipeline director.
//!
//! Owns the validated, enriched row set and hands out aggregate tables to the
//! presentation layer. Aggregations are pure over the enriched rows, so
//! repeated calls for the same segment serve a memoized copy.

use crate::analyzers::funnel::funnel_by_segment;
use crate::analyzers::types::{FunnelAggregate, ValueAggregate};
use crate::analyzers::value::value_by_segment;
use crate::config::PipelineConfig;
use crate::enrich::enrich;
use crate::error::ValidationError;
use crate::importer::validate;
use crate::record::{ApplicationRecord, EnrichedRecord, Segment};
use std::collections::HashMap;
use tracing::info;

pub struct Pipeline {
    config: PipelineConfig,
    rows: Vec<EnrichedRecord>,
    funnel_cache: HashMap<Segment, Vec<FunnelAggregate>>,
    value_cache: HashMap<Segment, Vec<ValueAggregate>>,
}

impl Pipeline {
    /// Validates and enriches a raw record set.
    ///
    /// Returns every validation error when the dataset violates the input
    /// contract; nothing is enriched in that case.
    pub fn from_records(
        records: &[ApplicationRecord],
        config: PipelineConfig,
    ) -> Result<Self, Vec<ValidationError>> {
        let errors = validate(records, &config);
        if !errors.is_empty() {
            return Err(errors);
        }

        let rows = enrich(records, &config).map_err(|e| vec![e])?;
        info!(rows = rows.len(), "Pipeline ready");

        Ok(Pipeline {
            config,
            rows,
            funnel_cache: HashMap::new(),
            value_cache: HashMap::new(),
        })
    }

    pub fn enriched(&self) -> &[EnrichedRecord] {
        &self.rows
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Funnel aggregate table for `segment`, memoized per segment.
    pub fn funnel(&mut self, segment: Segment) -> &[FunnelAggregate] {
        self.funnel_cache
            .entry(segment)
            .or_insert_with(|| funnel_by_segment(&self.rows, segment))
    }

    /// PV / optimal-CAC aggregate table for `segment`, memoized per segment.
    pub fn value(&mut self, segment: Segment) -> &[ValueAggregate] {
        self.value_cache
            .entry(segment)
            .or_insert_with(|| value_by_segment(&self.rows, segment, &self.config))
    }
}
