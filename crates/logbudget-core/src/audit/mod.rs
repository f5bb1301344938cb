//! Audit module
//!
//! - ProjectAuditor: evaluates one project's samples against the ceiling
//! - ProjectSource / MetricSource: collaborator seams for listing and metrics
//! - AuditRun: drives a whole run across projects

pub mod auditor;
pub mod run;
pub mod source;

pub use auditor::{Evaluation, ProjectAuditor, UsageReport};
pub use run::{
    AuditError, AuditOutcome, AuditRun, FailedProject, FailurePolicy, ProjectOutcome, SkipReason,
    SkippedProject,
};
pub use source::{MetricSource, ProjectSource};
