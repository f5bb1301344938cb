//! # logbudget core
//!
//! Budget proration, usage aggregation, and per-project auditing for log
//! ingestion.
//!
//! ## Ceiling Formula
//!
//! ```text
//! ceiling = floor(monthly_cap × day_of_month / days_in_month)
//! ```
//!
//! A project is over budget when the bytes it has ingested this month are
//! strictly greater than the ceiling.
//!
//! ## Flow
//!
//! ```text
//! AuditRun ──► ProjectSource::list_projects ──► filter ACTIVE
//!    │
//!    ├─► BudgetCalculator (once per run)
//!    └─► per project: MetricSource ──► UsageAggregator ──► ProjectAuditor ──► Reporter
//! ```

pub mod audit;
pub mod budget;
pub mod metering;
pub mod report;

pub use audit::{
    AuditError, AuditOutcome, AuditRun, Evaluation, FailurePolicy, MetricSource, ProjectAuditor,
    ProjectOutcome, ProjectSource, UsageReport,
};
pub use budget::{compute_ceiling, BudgetCalculator};
pub use metering::{UsageAggregator, UsageBreakdown};
pub use report::{ReportFormat, Reporter};

use logbudget_common::units::GIBIBYTE;
use logbudget_common::{MonthlyBudget, ProrationClock, DEFAULT_WINDOW_HOURS};

/// Default number of projects fetched concurrently
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Settings for one audit run
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Monthly ingestion cap
    pub budget: MonthlyBudget,
    /// Length of the metric query window ending at the evaluation instant
    pub window_hours: u32,
    /// Maximum concurrent metric fetches
    pub max_concurrency: usize,
    /// Handling of per-project fetch failures
    pub failure_policy: FailurePolicy,
    /// Calendar used to pick the proration day
    pub proration_clock: ProrationClock,
    /// Only audit these projects when non-empty
    pub projects: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            budget: MonthlyBudget::new(50 * GIBIBYTE),
            window_hours: DEFAULT_WINDOW_HOURS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            failure_policy: FailurePolicy::default(),
            proration_clock: ProrationClock::default(),
            projects: Vec::new(),
        }
    }
}
