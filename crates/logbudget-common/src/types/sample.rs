//! Raw ingestion samples

use serde::{Deserialize, Serialize};

/// One ingestion value for a project and resource type.
///
/// A metric source yields one sample per time series, already reduced to a
/// single byte value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSample {
    /// Project the series was recorded for
    pub project_id: String,
    /// Resource category that produced the logs, e.g. `k8s_cluster`
    pub resource_type: String,
    /// Bytes ingested this month
    pub bytes: u64,
}

impl UsageSample {
    pub fn new(project_id: impl Into<String>, resource_type: impl Into<String>, bytes: u64) -> Self {
        Self {
            project_id: project_id.into(),
            resource_type: resource_type.into(),
            bytes,
        }
    }
}
