//! Metering module
//!
//! Reduces raw ingestion samples into per-project usage:
//! - UsageAggregator: folds samples into a per-resource breakdown
//! - UsageBreakdown: per-resource byte totals plus the grand total

pub mod aggregator;

pub use aggregator::{UsageAggregator, UsageBreakdown};
