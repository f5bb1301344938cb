//! Per-project evaluation
//!
//! Aggregates a project's samples and compares the total against the run's
//! prorated ceiling. A project with no measured ingestion is skipped rather
//! than reported.

use crate::metering::{UsageAggregator, UsageBreakdown};
use logbudget_common::{ProratedCeiling, UsageSample};
use serde::Serialize;
use std::collections::BTreeMap;

/// Usage of one project measured against the ceiling
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageReport {
    project_id: String,
    by_resource: BTreeMap<String, u64>,
    total_bytes: u64,
    ceiling_bytes: u64,
    over_budget: bool,
}

impl UsageReport {
    fn new(breakdown: UsageBreakdown, ceiling: &ProratedCeiling) -> Self {
        let (project_id, by_resource, total_bytes) = breakdown.into_parts();
        Self {
            project_id,
            by_resource,
            total_bytes,
            ceiling_bytes: ceiling.bytes(),
            over_budget: ceiling.is_exceeded_by(total_bytes),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Bytes per resource type, ordered by resource type
    pub fn by_resource(&self) -> &BTreeMap<String, u64> {
        &self.by_resource
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Ceiling the total was compared against
    pub fn ceiling_bytes(&self) -> u64 {
        self.ceiling_bytes
    }

    pub fn over_budget(&self) -> bool {
        self.over_budget
    }
}

/// Result of evaluating one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The project ingested logs; here is how much
    Report(UsageReport),
    /// Nothing was ingested, so there is nothing to report
    Skip,
}

impl Evaluation {
    pub fn report(&self) -> Option<&UsageReport> {
        match self {
            Evaluation::Report(report) => Some(report),
            Evaluation::Skip => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Evaluation::Skip)
    }
}

/// Evaluates projects against a prorated ceiling
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectAuditor;

impl ProjectAuditor {
    /// Evaluate `samples` for `project_id`.
    ///
    /// Returns [`Evaluation::Skip`] exactly when the aggregated total is zero.
    pub fn evaluate<I>(project_id: &str, samples: I, ceiling: &ProratedCeiling) -> Evaluation
    where
        I: IntoIterator<Item = UsageSample>,
    {
        let breakdown = UsageAggregator::aggregate(samples, project_id);
        if breakdown.is_zero() {
            return Evaluation::Skip;
        }
        Evaluation::Report(UsageReport::new(breakdown, ceiling))
    }
}
