//! Layered configuration
//!
//! Later layers win:
//! 1. built-in defaults
//! 2. a TOML file (`--config`, or `logbudget.toml` when present)
//! 3. `LOGBUDGET_*` environment variables, including those from `.env`
//! 4. command line flags

use crate::cli::Cli;
use config::{Config, Environment, File};
use logbudget_common::{LogBudgetError, MonthlyBudget, ProrationClock, DEFAULT_MONTHLY_CAP, DEFAULT_WINDOW_HOURS};
use logbudget_core::{AuditConfig, FailurePolicy, ReportFormat, DEFAULT_MAX_CONCURRENCY};
use logbudget_gcp::{GcpEndpoints, GcpSettings, RetryPolicy};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "LOGBUDGET";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "logbudget";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub monthly_cap: String,
    pub window_hours: u32,
    pub max_concurrency: usize,
    pub failure_policy: FailurePolicy,
    pub proration_clock: ProrationClock,
    pub projects: Vec<String>,
    pub format: ReportFormat,
    pub fail_on_over_budget: bool,
    pub access_token: Option<String>,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub endpoints: GcpEndpoints,
}

impl Default for AppConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            monthly_cap: DEFAULT_MONTHLY_CAP.to_string(),
            window_hours: DEFAULT_WINDOW_HOURS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            failure_policy: FailurePolicy::default(),
            proration_clock: ProrationClock::default(),
            projects: Vec::new(),
            format: ReportFormat::default(),
            fail_on_over_budget: false,
            access_token: None,
            request_timeout_secs: logbudget_gcp::client::DEFAULT_TIMEOUT_SECS,
            max_retries: retry.max_retries,
            retry_base_delay_ms: retry.base_delay.as_millis() as u64,
            endpoints: GcpEndpoints::default(),
        }
    }
}

impl AppConfig {
    /// Load every layer for this invocation
    pub fn load(cli: &Cli) -> Result<Self, LogBudgetError> {
        // A missing .env is fine
        let _ = dotenvy::dotenv();

        let mut cfg = Self::layered(cli.config.as_deref(), ENV_PREFIX)?;
        cfg.apply_cli(cli);
        Ok(cfg)
    }

    /// Defaults, then the config file, then environment variables with `env_prefix`
    pub fn layered(file: Option<&Path>, env_prefix: &str) -> Result<Self, LogBudgetError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let environment = Environment::with_prefix(env_prefix)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("projects");

        Config::builder()
            .add_source(file_source)
            .add_source(environment)
            .build()
            .and_then(|c| c.try_deserialize::<AppConfig>())
            .map_err(|e| LogBudgetError::Config(e.to_string()))
    }

    /// Command line flags override every other layer
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(cap) = &cli.monthly_cap {
            self.monthly_cap = cap.clone();
        }
        if let Some(hours) = cli.window_hours {
            self.window_hours = hours;
        }
        if !cli.projects.is_empty() {
            self.projects = cli.projects.clone();
        }
        if let Some(format) = cli.format {
            self.format = format.into();
        }
        if let Some(policy) = cli.failure_policy {
            self.failure_policy = policy.into();
        }
        if let Some(clock) = cli.proration_clock {
            self.proration_clock = clock.into();
        }
        if let Some(concurrency) = cli.max_concurrency {
            self.max_concurrency = concurrency;
        }
        if let Some(token) = &cli.access_token {
            self.access_token = Some(token.clone());
        }
        if cli.fail_on_over_budget {
            self.fail_on_over_budget = true;
        }
    }

    /// Validate and split into audit and Google Cloud settings
    pub fn resolve(&self) -> Result<(AuditConfig, GcpSettings), LogBudgetError> {
        let budget = MonthlyBudget::parse(&self.monthly_cap)?;

        if self.window_hours == 0 {
            return Err(LogBudgetError::Config(
                "window_hours must be at least 1".into(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(LogBudgetError::Config(
                "max_concurrency must be at least 1".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(LogBudgetError::Config(
                "request_timeout_secs must be at least 1".into(),
            ));
        }

        let audit = AuditConfig {
            budget,
            window_hours: self.window_hours,
            max_concurrency: self.max_concurrency,
            failure_policy: self.failure_policy,
            proration_clock: self.proration_clock,
            projects: self.projects.clone(),
        };

        let gcp = GcpSettings {
            access_token: self.access_token.clone().filter(|t| !t.is_empty()),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            retry: RetryPolicy {
                max_retries: self.max_retries,
                base_delay: Duration::from_millis(self.retry_base_delay_ms),
            },
            endpoints: self.endpoints.clone(),
        };

        Ok((audit, gcp))
    }
}
