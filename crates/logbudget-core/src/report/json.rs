//! JSON report

use super::Reporter;
use crate::audit::{AuditOutcome, FailedProject, SkipReason, SkippedProject, UsageReport};
use chrono::{DateTime, NaiveDate, Utc};
use logbudget_common::{QueryWindow, Result};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct JsonDocument<'a> {
    evaluated_at: DateTime<Utc>,
    proration_date: NaiveDate,
    monthly_cap_bytes: u64,
    ceiling_bytes: u64,
    window: &'a QueryWindow,
    reports: Vec<&'a UsageReport>,
    skipped: Vec<&'a SkippedProject>,
    failed: Vec<&'a FailedProject>,
}

#[derive(Debug, Clone, Copy)]
pub struct JsonReporter {
    pretty: bool,
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonReporter {
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Reporter for JsonReporter {
    fn render(&self, outcome: &AuditOutcome, out: &mut dyn Write) -> Result<()> {
        let document = JsonDocument {
            evaluated_at: outcome.evaluated_at.instant(),
            proration_date: outcome.ceiling.date(),
            monthly_cap_bytes: outcome.budget.cap_bytes(),
            ceiling_bytes: outcome.ceiling.bytes(),
            window: &outcome.window,
            reports: outcome.reports().collect(),
            // Projects without usage are not surfaced
            skipped: outcome
                .skipped()
                .filter(|s| !matches!(s.reason, SkipReason::NoUsage))
                .collect(),
            failed: outcome.failures().collect(),
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, &document)?;
        } else {
            serde_json::to_writer(&mut *out, &document)?;
        }
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}
