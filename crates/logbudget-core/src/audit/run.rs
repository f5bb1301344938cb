//! Audit run orchestration
//!
//! One run computes the ceiling once, lists projects, skips the inactive
//! ones, fetches samples for the rest with bounded concurrency and evaluates
//! each project. Outcomes are sorted by project id so reports are stable
//! regardless of fetch completion order. A fail-fast run that stops on a
//! project still hands back what it finished before the failure.

use super::auditor::{Evaluation, ProjectAuditor, UsageReport};
use super::source::{MetricSource, ProjectSource};
use crate::budget::BudgetCalculator;
use crate::AuditConfig;
use futures::stream::{self, StreamExt};
use logbudget_common::{
    EvaluationInstant, LifecycleState, LogBudgetError, MonthlyBudget, Project, ProratedCeiling,
    QueryWindow,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Why a run did not complete
#[derive(Debug, Error)]
pub enum AuditError {
    /// Nothing was audited
    #[error(transparent)]
    Failed(#[from] LogBudgetError),

    /// A fail-fast run stopped on a project failure
    #[error("{error}")]
    Aborted {
        /// Projects finished before the failure
        partial: Box<AuditOutcome>,
        error: LogBudgetError,
    },
}

impl AuditError {
    /// Outcomes completed before the run stopped, if any
    pub fn partial(&self) -> Option<&AuditOutcome> {
        match self {
            AuditError::Failed(_) => None,
            AuditError::Aborted { partial, .. } => Some(partial),
        }
    }

    pub fn error(&self) -> &LogBudgetError {
        match self {
            AuditError::Failed(error) | AuditError::Aborted { error, .. } => error,
        }
    }

    pub fn into_error(self) -> LogBudgetError {
        match self {
            AuditError::Failed(error) | AuditError::Aborted { error, .. } => error,
        }
    }
}

/// What to do when fetching one project's metrics fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the whole run on the first failure
    #[default]
    FailFast,
    /// Record the failure for that project and keep going
    Isolate,
}

/// Why a project produced no report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The project is not in the ACTIVE lifecycle state
    Inactive { state: LifecycleState },
    /// No ingestion was measured
    NoUsage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedProject {
    pub project_id: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedProject {
    pub project_id: String,
    pub error: String,
}

/// Outcome for a single project within a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectOutcome {
    Reported(UsageReport),
    Skipped(SkippedProject),
    Failed(FailedProject),
}

impl ProjectOutcome {
    pub fn project_id(&self) -> &str {
        match self {
            ProjectOutcome::Reported(report) => report.project_id(),
            ProjectOutcome::Skipped(skipped) => &skipped.project_id,
            ProjectOutcome::Failed(failed) => &failed.project_id,
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub evaluated_at: EvaluationInstant,
    pub budget: MonthlyBudget,
    pub ceiling: ProratedCeiling,
    pub window: QueryWindow,
    /// Per-project outcomes ordered by project id
    pub projects: Vec<ProjectOutcome>,
}

impl AuditOutcome {
    pub fn reports(&self) -> impl Iterator<Item = &UsageReport> {
        self.projects.iter().filter_map(|outcome| match outcome {
            ProjectOutcome::Reported(report) => Some(report),
            _ => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SkippedProject> {
        self.projects.iter().filter_map(|outcome| match outcome {
            ProjectOutcome::Skipped(skipped) => Some(skipped),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &FailedProject> {
        self.projects.iter().filter_map(|outcome| match outcome {
            ProjectOutcome::Failed(failed) => Some(failed),
            _ => None,
        })
    }

    pub fn any_over_budget(&self) -> bool {
        self.reports().any(UsageReport::over_budget)
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Audits every project visible to a [`ProjectSource`]
pub struct AuditRun<P, M> {
    projects: P,
    metrics: M,
    calculator: BudgetCalculator,
    config: AuditConfig,
}

impl<P: ProjectSource, M: MetricSource> AuditRun<P, M> {
    pub fn new(projects: P, metrics: M, config: AuditConfig) -> Self {
        Self {
            projects,
            metrics,
            calculator: BudgetCalculator::new(config.budget),
            config,
        }
    }

    /// Audit all projects as of `at`.
    ///
    /// # Errors
    /// [`AuditError::Failed`] when projects cannot be listed.
    /// [`AuditError::Aborted`] under [`FailurePolicy::FailFast`] on the first
    /// metric fetch failure, carrying the outcomes completed so far.
    #[instrument(skip(self), fields(run_id = %Uuid::now_v7()))]
    pub async fn execute(&self, at: EvaluationInstant) -> Result<AuditOutcome, AuditError> {
        let ceiling = self
            .calculator
            .ceiling_for(at.proration_date(self.config.proration_clock));
        let window = at.window(self.config.window_hours);

        info!(
            date = %ceiling.date(),
            ceiling = %ceiling,
            monthly_cap = %self.calculator.budget(),
            "Computed target log ingestion"
        );

        let listed = self
            .projects
            .list_projects()
            .await
            .map_err(LogBudgetError::ProjectListing)?;
        let listed = self.select_projects(listed);
        info!(count = listed.len(), "Listed projects");

        let mut outcomes = Vec::with_capacity(listed.len());
        let mut active = Vec::new();
        for project in listed {
            if project.is_active() {
                active.push(project.project_id);
            } else {
                info!(
                    project_id = %project.project_id,
                    state = %project.lifecycle_state,
                    "Skipping project due to project state"
                );
                outcomes.push(ProjectOutcome::Skipped(SkippedProject {
                    project_id: project.project_id,
                    reason: SkipReason::Inactive {
                        state: project.lifecycle_state,
                    },
                }));
            }
        }
        active.sort();

        let window_ref = &window;
        let mut fetches = stream::iter(active)
            .map(move |project_id| async move {
                let result = self
                    .metrics
                    .fetch_ingestion_samples(&project_id, window_ref)
                    .await;
                (project_id, result)
            })
            .buffer_unordered(self.config.max_concurrency.max(1));

        while let Some((project_id, result)) = fetches.next().await {
            let samples = match result {
                Ok(samples) => samples,
                Err(source) => match self.config.failure_policy {
                    FailurePolicy::FailFast => {
                        error!(%project_id, error = %source, "Failed to get log usage, aborting run");
                        return Err(AuditError::Aborted {
                            partial: Box::new(self.finish(at, ceiling, window, outcomes)),
                            error: LogBudgetError::ProjectUsage { project_id, source },
                        });
                    }
                    FailurePolicy::Isolate => {
                        warn!(%project_id, error = %source, "Failed to get log usage, continuing");
                        outcomes.push(ProjectOutcome::Failed(FailedProject {
                            project_id,
                            error: source.to_string(),
                        }));
                        continue;
                    }
                },
            };

            match ProjectAuditor::evaluate(&project_id, samples, &ceiling) {
                Evaluation::Report(report) => {
                    if report.over_budget() {
                        warn!(
                            %project_id,
                            total_bytes = report.total_bytes(),
                            ceiling_bytes = report.ceiling_bytes(),
                            "Log ingestion is over the prorated target"
                        );
                    } else {
                        debug!(%project_id, total_bytes = report.total_bytes(), "Within target");
                    }
                    outcomes.push(ProjectOutcome::Reported(report));
                }
                Evaluation::Skip => {
                    debug!(%project_id, "No log ingestion measured");
                    outcomes.push(ProjectOutcome::Skipped(SkippedProject {
                        project_id,
                        reason: SkipReason::NoUsage,
                    }));
                }
            }
        }

        drop(fetches);

        Ok(self.finish(at, ceiling, window, outcomes))
    }

    fn finish(
        &self,
        at: EvaluationInstant,
        ceiling: ProratedCeiling,
        window: QueryWindow,
        mut outcomes: Vec<ProjectOutcome>,
    ) -> AuditOutcome {
        outcomes.sort_by(|a, b| a.project_id().cmp(b.project_id()));

        AuditOutcome {
            evaluated_at: at,
            budget: self.calculator.budget(),
            ceiling,
            window,
            projects: outcomes,
        }
    }

    /// Restrict listed projects to the configured allowlist, if any
    fn select_projects(&self, listed: Vec<Project>) -> Vec<Project> {
        if self.config.projects.is_empty() {
            return listed;
        }

        for wanted in &self.config.projects {
            if !listed.iter().any(|p| &p.project_id == wanted) {
                warn!(project_id = %wanted, "Configured project was not returned by the project listing");
            }
        }

        listed
            .into_iter()
            .filter(|p| self.config.projects.contains(&p.project_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::source::{MockMetricSource, MockProjectSource};
    use chrono::{TimeZone, Utc};
    use logbudget_common::{ProrationClock, SourceError, UsageSample};

    fn instant() -> EvaluationInstant {
        EvaluationInstant::at(Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap())
    }

    fn config() -> AuditConfig {
        AuditConfig {
            budget: MonthlyBudget::parse("50G").unwrap(),
            proration_clock: ProrationClock::Utc,
            ..AuditConfig::default()
        }
    }

    fn projects(list: Vec<Project>) -> MockProjectSource {
        let mut source = MockProjectSource::new();
        source
            .expect_list_projects()
            .times(1)
            .returning(move || Ok(list.clone()));
        source
    }

    #[tokio::test]
    async fn test_run_reports_skips_and_sorts() {
        let projects = projects(vec![
            Project::new("zeta", LifecycleState::Active),
            Project::new("alpha", LifecycleState::Active),
            Project::new("gone", LifecycleState::DeleteRequested),
            Project::new("quiet", LifecycleState::Active),
        ]);

        let mut metrics = MockMetricSource::new();
        metrics
            .expect_fetch_ingestion_samples()
            .times(3)
            .returning(|project_id, _window| {
                Ok(match project_id {
                    "alpha" => vec![
                        UsageSample::new("alpha", "gce", 10_000_000_000),
                        UsageSample::new("alpha", "gke", 9_000_000_000),
                    ],
                    "zeta" => vec![UsageSample::new("zeta", "gce", 1_000)],
                    _ => vec![],
                })
            });

        let run = AuditRun::new(projects, metrics, config());
        let outcome = run.execute(instant()).await.unwrap();

        assert_eq!(outcome.ceiling.bytes(), 17_895_697_066);
        let ids: Vec<_> = outcome.projects.iter().map(ProjectOutcome::project_id).collect();
        assert_eq!(ids, vec!["alpha", "gone", "quiet", "zeta"]);

        let reports: Vec<_> = outcome.reports().collect();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].over_budget());
        assert!(!reports[1].over_budget());
        assert!(outcome.any_over_budget());

        let skipped: Vec<_> = outcome.skipped().collect();
        assert_eq!(
            skipped[0].reason,
            SkipReason::Inactive {
                state: LifecycleState::DeleteRequested
            }
        );
        assert_eq!(skipped[1].reason, SkipReason::NoUsage);
        assert!(!outcome.has_failures());
    }

    #[tokio::test]
    async fn test_inactive_projects_are_never_queried() {
        let projects = projects(vec![
            Project::new("a", LifecycleState::DeleteInProgress),
            Project::new("b", LifecycleState::LifecycleStateUnspecified),
        ]);
        let mut metrics = MockMetricSource::new();
        metrics.expect_fetch_ingestion_samples().never();

        let outcome = AuditRun::new(projects, metrics, config())
            .execute(instant())
            .await
            .unwrap();

        assert_eq!(outcome.skipped().count(), 2);
        assert_eq!(outcome.reports().count(), 0);
    }

    #[tokio::test]
    async fn test_listing_failure_aborts() {
        let mut projects = MockProjectSource::new();
        projects
            .expect_list_projects()
            .returning(|| Err(SourceError::Auth("token rejected".into())));
        let metrics = MockMetricSource::new();

        let err = AuditRun::new(projects, metrics, config())
            .execute(instant())
            .await
            .unwrap_err();

        assert!(err.partial().is_none());
        assert!(matches!(
            err,
            AuditError::Failed(LogBudgetError::ProjectListing(SourceError::Auth(_)))
        ));
        assert!(err.to_string().contains("error getting list of projects"));
    }

    #[tokio::test]
    async fn test_fail_fast_aborts_on_fetch_error() {
        let projects = projects(vec![Project::new("p1", LifecycleState::Active)]);
        let mut metrics = MockMetricSource::new();
        metrics.expect_fetch_ingestion_samples().returning(|_, _| {
            Err(SourceError::Api {
                status: 403,
                message: "monitoring disabled".into(),
            })
        });

        let err = AuditRun::new(projects, metrics, config())
            .execute(instant())
            .await
            .unwrap_err();

        match err.error() {
            LogBudgetError::ProjectUsage { project_id, .. } => assert_eq!(project_id, "p1"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.partial().unwrap().projects.is_empty());
    }

    #[tokio::test]
    async fn test_fail_fast_keeps_finished_projects() {
        let projects = projects(vec![
            Project::new("a", LifecycleState::Active),
            Project::new("old", LifecycleState::DeleteRequested),
            Project::new("z", LifecycleState::Active),
        ]);
        let mut metrics = MockMetricSource::new();
        metrics
            .expect_fetch_ingestion_samples()
            .times(2)
            .returning(|project_id, _| match project_id {
                "a" => Ok(vec![UsageSample::new("a", "gce", 1 << 40)]),
                _ => Err(SourceError::Api {
                    status: 400,
                    message: "x".into(),
                }),
            });

        let config = AuditConfig {
            max_concurrency: 1,
            ..config()
        };
        let err = AuditRun::new(projects, metrics, config)
            .execute(instant())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "error getting log usage for project z: API error: 400 - x"
        );
        let partial = err.partial().unwrap();
        let ids: Vec<_> = partial.projects.iter().map(ProjectOutcome::project_id).collect();
        assert_eq!(ids, vec!["a", "old"]);
        assert!(partial.any_over_budget());
        assert_eq!(partial.skipped().count(), 1);
    }

    #[tokio::test]
    async fn test_isolate_records_failure_and_continues() {
        let projects = projects(vec![
            Project::new("broken", LifecycleState::Active),
            Project::new("fine", LifecycleState::Active),
        ]);
        let mut metrics = MockMetricSource::new();
        metrics
            .expect_fetch_ingestion_samples()
            .times(2)
            .returning(|project_id, _| match project_id {
                "broken" => Err(SourceError::Timeout("30s".into())),
                _ => Ok(vec![UsageSample::new("fine", "gce", 42)]),
            });

        let config = AuditConfig {
            failure_policy: FailurePolicy::Isolate,
            ..config()
        };
        let outcome = AuditRun::new(projects, metrics, config)
            .execute(instant())
            .await
            .unwrap();

        assert!(outcome.has_failures());
        let failed: Vec<_> = outcome.failures().collect();
        assert_eq!(failed[0].project_id, "broken");
        assert!(failed[0].error.contains("timed out"));
        assert_eq!(outcome.reports().count(), 1);
    }

    #[tokio::test]
    async fn test_allowlist_limits_projects() {
        let projects = projects(vec![
            Project::new("keep", LifecycleState::Active),
            Project::new("ignore", LifecycleState::Active),
        ]);
        let mut metrics = MockMetricSource::new();
        metrics
            .expect_fetch_ingestion_samples()
            .times(1)
            .returning(|project_id, _| {
                assert_eq!(project_id, "keep");
                Ok(vec![UsageSample::new("keep", "gce", 1)])
            });

        let config = AuditConfig {
            projects: vec!["keep".into(), "missing".into()],
            ..config()
        };
        let outcome = AuditRun::new(projects, metrics, config)
            .execute(instant())
            .await
            .unwrap();

        assert_eq!(outcome.projects.len(), 1);
        assert_eq!(outcome.projects[0].project_id(), "keep");
    }

    #[tokio::test]
    async fn test_window_is_threaded_from_instant() {
        let projects = projects(vec![Project::new("p1", LifecycleState::Active)]);
        let mut metrics = MockMetricSource::new();
        let expected = instant().window(2);
        metrics
            .expect_fetch_ingestion_samples()
            .times(1)
            .returning(move |_, window| {
                assert_eq!(*window, expected);
                Ok(vec![])
            });

        let outcome = AuditRun::new(projects, metrics, config())
            .execute(instant())
            .await
            .unwrap();
        assert_eq!(outcome.window, expected);
    }
}
