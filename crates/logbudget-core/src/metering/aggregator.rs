//! Usage aggregation
//!
//! Folds ingestion samples for one project into bytes per resource type and a
//! grand total. The aggregator knows nothing about budgets; comparing the
//! total against a ceiling is the auditor's job.

use logbudget_common::UsageSample;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Ingested bytes for one project, by resource type.
///
/// `total_bytes` always equals the sum of `by_resource`. Once the total
/// reaches `u64::MAX` further bytes are dropped from both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageBreakdown {
    project_id: String,
    by_resource: BTreeMap<String, u64>,
    total_bytes: u64,
}

impl UsageBreakdown {
    /// Zero usage for a project
    pub fn empty(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            by_resource: BTreeMap::new(),
            total_bytes: 0,
        }
    }

    fn add_sample(&mut self, resource_type: String, bytes: u64) {
        // Every entry is bounded by the total, so clamping here keeps both in step
        let added = match self.total_bytes.checked_add(bytes) {
            Some(_) => bytes,
            None => u64::MAX - self.total_bytes,
        };
        *self.by_resource.entry(resource_type).or_insert(0) += added;
        self.total_bytes += added;
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

    pub fn is_zero(&self) -> bool {
        self.total_bytes == 0
    }

    pub(crate) fn into_parts(self) -> (String, BTreeMap<String, u64>, u64) {
        (self.project_id, self.by_resource, self.total_bytes)
    }
}

/// Folds samples into a [`UsageBreakdown`]
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageAggregator;

impl UsageAggregator {
    /// Aggregate the samples that belong to `project_id`.
    ///
    /// Samples recorded for any other project are dropped; a metric source may
    /// leak series from other projects and those must not be billed here.
    pub fn aggregate<I>(samples: I, project_id: &str) -> UsageBreakdown
    where
        I: IntoIterator<Item = UsageSample>,
    {
        let mut breakdown = UsageBreakdown::empty(project_id);
        let mut dropped = 0usize;

        for sample in samples {
            if sample.project_id != project_id {
                dropped += 1;
                continue;
            }
            breakdown.add_sample(sample.resource_type, sample.bytes);
        }

        if dropped > 0 {
            debug!(project_id, dropped, "Dropped samples recorded for other projects");
        }
        breakdown
    }
}
