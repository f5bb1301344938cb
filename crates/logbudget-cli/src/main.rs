//! logbudget - audit log ingestion against a prorated monthly budget

use anyhow::{Context, Result};
use clap::Parser;
use logbudget_cli::cli::{Cli, LogFormat};
use logbudget_cli::config::AppConfig;
use logbudget_cli::{finish_run, until_interrupted, EXIT_ERROR, EXIT_INTERRUPTED};
use logbudget_common::EvaluationInstant;
use logbudget_core::AuditRun;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Logs go to stderr so stdout carries only the report
fn init_tracing(verbose: bool, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("logbudget_cli=debug,logbudget_core=debug,logbudget_gcp=debug,info")
        } else {
            EnvFilter::new("info")
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let app = AppConfig::load(&cli)?;
    let (audit, gcp) = app.resolve()?;

    let at = EvaluationInstant::now();
    tracing::info!(
        evaluated_at = %at.instant(),
        monthly_cap = %audit.budget,
        window_hours = audit.window_hours,
        failure_policy = ?audit.failure_policy,
        "Starting log ingestion audit"
    );

    let (projects, metrics) = logbudget_gcp::connect(&gcp)
        .await
        .context("failed to set up Google Cloud access")?;
    let audit_run = AuditRun::new(projects, metrics, audit);

    let Some(result) = until_interrupted(audit_run.execute(at), tokio::signal::ctrl_c()).await
    else {
        warn!("Interrupted, abandoning audit");
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    };

    let reporter = app.format.reporter();
    let mut stdout = std::io::stdout().lock();
    let status = finish_run(
        result,
        reporter.as_ref(),
        app.fail_on_over_budget,
        &mut stdout,
    )?;

    Ok(ExitCode::from(status))
}
