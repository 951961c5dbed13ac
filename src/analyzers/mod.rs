//! Segment-level aggregation.
//!
//! Groups enriched application rows by a segment key and derives
//! conversion-funnel ratios and PV/optimal-CAC economics per group, plus the
//! display formatting layered on top of the numeric value table.

pub mod format;
pub mod funnel;
pub mod types;
pub mod utility;
pub mod value;
