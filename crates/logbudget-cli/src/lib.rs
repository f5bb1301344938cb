//! logbudget command line application
//!
//! Wires configuration, the Google Cloud sources and the audit run together.

pub mod cli;
pub mod config;

use logbudget_common::LogBudgetError;
use logbudget_core::{AuditError, AuditOutcome, Reporter};
use std::future::Future;
use std::io::Write;
use tracing::warn;

/// Exit status for a run that failed or was aborted
pub const EXIT_ERROR: u8 = 1;

/// Exit status when `fail_on_over_budget` is set and a project is over
pub const EXIT_OVER_BUDGET: u8 = 2;

/// Exit status after Ctrl-C
pub const EXIT_INTERRUPTED: u8 = 130;

/// Exit status for a completed run
pub fn exit_status(outcome: &AuditOutcome, fail_on_over_budget: bool) -> u8 {
    if outcome.has_failures() {
        EXIT_ERROR
    } else if fail_on_over_budget && outcome.any_over_budget() {
        EXIT_OVER_BUDGET
    } else {
        0
    }
}

/// Drive `run` until it finishes or `interrupt` resolves.
///
/// Returns `None` when interrupted. If listening for the interrupt fails the
/// run is awaited to completion instead.
pub async fn until_interrupted<F, S>(run: F, interrupt: S) -> Option<F::Output>
where
    F: Future,
    S: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(run);
    tokio::select! {
        output = &mut run => Some(output),
        signal = interrupt => match signal {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "Cannot listen for Ctrl-C, running audit to completion");
                Some(run.await)
            }
        }
    }
}

/// Render the result of a run and pick the exit status.
///
/// An aborted run still renders the projects it finished; its error is
/// returned once that partial report is written.
pub fn finish_run(
    result: Result<AuditOutcome, AuditError>,
    reporter: &dyn Reporter,
    fail_on_over_budget: bool,
    out: &mut dyn Write,
) -> Result<u8, LogBudgetError> {
    match result {
        Ok(outcome) => {
            reporter.render(&outcome, out)?;
            out.flush()?;
            Ok(exit_status(&outcome, fail_on_over_budget))
        }
        Err(err) => {
            if let Some(partial) = err.partial() {
                warn!(
                    completed = partial.projects.len(),
                    "Audit aborted, reporting completed projects"
                );
                reporter.render(partial, out)?;
                out.flush()?;
            }
            Err(err.into_error())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;

    #[tokio::test]
    async fn test_interrupt_abandons_run() {
        let run = std::future::pending::<u8>();
        let interrupt = std::future::ready(Ok(()));

        assert_eq!(until_interrupted(run, interrupt).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_interrupt_listener_runs_to_completion() {
        let run = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            7u8
        };
        let interrupt = std::future::ready(Err(io::Error::new(
            io::ErrorKind::Other,
            "signal handler unavailable",
        )));

        assert_eq!(until_interrupted(run, interrupt).await, Some(7));
    }

    #[tokio::test]
    async fn test_finished_run_wins() {
        let run = std::future::ready(3u8);

        assert_eq!(
            until_interrupted(run, std::future::pending()).await,
            Some(3)
        );
    }
}
