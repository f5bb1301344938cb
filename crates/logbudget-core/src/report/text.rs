//! Plain-text report
//!
//! ```text
//! Target log ingestion for 2024-06-10: 16.7G of 50G monthly
//!
//! Project p1
//! gce - 9.3G
//! gke - 8.4G
//! TOTAL - 17.7G
//! [WARNING] Current log ingestion of 17.7G is greater than the target value of 16.7G, consider adding log exclusions
//! ```

use super::Reporter;
use crate::audit::{AuditOutcome, ProjectOutcome, SkipReason, UsageReport};
use logbudget_common::units::format_bytes;
use logbudget_common::Result;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextReporter;

impl TextReporter {
    fn write_report(report: &UsageReport, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out)?;
        writeln!(out, "Project {}", report.project_id())?;
        for (resource, bytes) in report.by_resource() {
            writeln!(out, "{} - {}", resource, format_bytes(*bytes))?;
        }
        writeln!(out, "TOTAL - {}", format_bytes(report.total_bytes()))?;

        if report.over_budget() {
            writeln!(
                out,
                "[WARNING] Current log ingestion of {} is greater than the target value of {}, consider adding log exclusions",
                format_bytes(report.total_bytes()),
                format_bytes(report.ceiling_bytes())
            )?;
        }
        Ok(())
    }
}

impl Reporter for TextReporter {
    fn render(&self, outcome: &AuditOutcome, out: &mut dyn Write) -> Result<()> {
        writeln!(
            out,
            "Target log ingestion for {}: {} of {} monthly",
            outcome.ceiling.date(),
            outcome.ceiling,
            outcome.budget
        )?;

        for project in &outcome.projects {
            match project {
                ProjectOutcome::Reported(report) => Self::write_report(report, out)?,
                ProjectOutcome::Skipped(skipped) => match &skipped.reason {
                    SkipReason::Inactive { state } => {
                        writeln!(out)?;
                        writeln!(
                            out,
                            "Skipping project {} due to project state {}",
                            skipped.project_id, state
                        )?;
                    }
                    SkipReason::NoUsage => {}
                },
                ProjectOutcome::Failed(failed) => {
                    writeln!(out)?;
                    writeln!(
                        out,
                        "[ERROR] Failed to audit project {}: {}",
                        failed.project_id, failed.error
                    )?;
                }
            }
        }

        out.flush()?;
        Ok(())
    }
}
