//! Command line flags

use clap::{Parser, ValueEnum};
use logbudget_common::ProrationClock;
use logbudget_core::{FailurePolicy, ReportFormat};
use std::path::PathBuf;

/// Audit month-to-date log ingestion of every active project against a
/// prorated monthly budget.
#[derive(Debug, Parser)]
#[command(name = "logbudget")]
#[command(about = "Audit log ingestion against a prorated monthly budget")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./logbudget.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Monthly ingestion cap, e.g. 50G or 1.5TiB
    #[arg(long)]
    pub monthly_cap: Option<String>,

    /// Hours of metric data to query, ending now
    #[arg(long)]
    pub window_hours: Option<u32>,

    /// Only audit this project (repeatable)
    #[arg(long = "project", value_name = "PROJECT_ID")]
    pub projects: Vec<String>,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// What to do when one project's metrics cannot be fetched
    #[arg(long, value_enum)]
    pub failure_policy: Option<PolicyArg>,

    /// Calendar that decides the day of the month
    #[arg(long, value_enum)]
    pub proration_clock: Option<ClockArg>,

    /// Projects queried concurrently
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// OAuth access token, bypassing credential discovery
    #[arg(long, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Exit with status 2 when any project is over budget
    #[arg(long)]
    pub fail_on_over_budget: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    FailFast,
    Isolate,
}

impl From<PolicyArg> for FailurePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::FailFast => FailurePolicy::FailFast,
            PolicyArg::Isolate => FailurePolicy::Isolate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClockArg {
    Local,
    Utc,
}

impl From<ClockArg> for ProrationClock {
    fn from(arg: ClockArg) -> Self {
        match arg {
            ClockArg::Local => ProrationClock::Local,
            ClockArg::Utc => ProrationClock::Utc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "logbudget",
            "--monthly-cap",
            "1T",
            "--project",
            "alpha",
            "--project",
            "beta",
            "--format",
            "json",
            "--failure-policy",
            "isolate",
            "--proration-clock",
            "utc",
            "--fail-on-over-budget",
        ])
        .unwrap();

        assert_eq!(cli.monthly_cap.as_deref(), Some("1T"));
        assert_eq!(cli.projects, vec!["alpha", "beta"]);
        assert_eq!(cli.format, Some(FormatArg::Json));
        assert_eq!(cli.failure_policy, Some(PolicyArg::Isolate));
        assert_eq!(cli.proration_clock, Some(ClockArg::Utc));
        assert!(cli.fail_on_over_budget);
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["logbudget", "--format", "yaml"]).is_err());
    }
}
