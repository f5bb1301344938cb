//! # logbudget common
//!
//! Shared types, errors, and unit helpers for the logbudget ingestion auditor.
//!
//! ## Core Types
//!
//! - [`MonthlyBudget`]: fixed monthly ingestion cap in bytes
//! - [`ProratedCeiling`]: the share of the cap allowed up to a given day
//! - [`UsageSample`]: one ingestion value for a project and resource type
//! - [`Project`]: a cloud project and its lifecycle state
//! - [`EvaluationInstant`]/[`QueryWindow`]: the reference instant of a run and its metric window
//!
//! ## Units
//!
//! - [`units::parse_bytes`]/[`units::format_bytes`]: human byte quantities such as `50G` or `1.5TiB`

pub mod error;
pub mod types;
pub mod units;

// Re-export commonly used types at crate root
pub use error::{BudgetError, ByteSizeError, LogBudgetError, Result, SourceError};
pub use types::{
    budget::{MonthlyBudget, ProratedCeiling},
    project::{LifecycleState, Project},
    sample::UsageSample,
    time::{EvaluationInstant, ProrationClock, QueryWindow},
};

/// Cloud Monitoring metric that reports bytes ingested so far this billing month
pub const INGESTION_METRIC_TYPE: &str = "logging.googleapis.com/billing/monthly_bytes_ingested";

/// Default monthly ingestion cap
pub const DEFAULT_MONTHLY_CAP: &str = "50G";

/// Default length of the metric query window in hours
pub const DEFAULT_WINDOW_HOURS: u32 = 2;
