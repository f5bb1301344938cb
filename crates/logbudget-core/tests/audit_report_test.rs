//! End-to-end tests for an audit run rendered through both reporters,
//! using in-memory project and metric sources.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use logbudget_common::{
    EvaluationInstant, LifecycleState, MonthlyBudget, Project, ProrationClock, QueryWindow,
    SourceError, UsageSample,
};
use logbudget_core::audit::FailurePolicy;
use logbudget_core::report::{JsonReporter, Reporter, TextReporter};
use logbudget_core::{AuditConfig, AuditRun, MetricSource, ProjectSource};
use std::collections::HashMap;
use std::sync::Arc;

struct StaticProjects(Vec<Project>);

#[async_trait]
impl ProjectSource for StaticProjects {
    async fn list_projects(&self) -> Result<Vec<Project>, SourceError> {
        Ok(self.0.clone())
    }
}

/// Returns canned samples per project; projects without an entry fail
struct StaticMetrics(HashMap<String, Vec<UsageSample>>);

#[async_trait]
impl MetricSource for StaticMetrics {
    async fn fetch_ingestion_samples(
        &self,
        project_id: &str,
        _window: &QueryWindow,
    ) -> Result<Vec<UsageSample>, SourceError> {
        self.0.get(project_id).cloned().ok_or_else(|| SourceError::Api {
            status: 403,
            message: format!("permission denied on {project_id}"),
        })
    }
}

fn instant() -> EvaluationInstant {
    EvaluationInstant::at(Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap())
}

fn config(policy: FailurePolicy) -> AuditConfig {
    AuditConfig {
        budget: MonthlyBudget::parse("50G").unwrap(),
        proration_clock: ProrationClock::Utc,
        failure_policy: policy,
        ..AuditConfig::default()
    }
}

fn fixture() -> (StaticProjects, StaticMetrics) {
    let projects = StaticProjects(vec![
        Project::new("p1", LifecycleState::Active),
        Project::new("old", LifecycleState::DeleteRequested),
        Project::new("idle", LifecycleState::Active),
        Project::new("denied", LifecycleState::Active),
    ]);

    let mut samples = HashMap::new();
    samples.insert(
        "p1".to_string(),
        vec![
            UsageSample::new("p1", "gke", 9_000_000_000),
            UsageSample::new("p1", "gce", 10_000_000_000),
            // leaked series from another project
            UsageSample::new("other", "gce", 99_000_000_000),
        ],
    );
    samples.insert("idle".to_string(), vec![]);

    (projects, StaticMetrics(samples))
}

#[tokio::test]
async fn test_text_report_matches_expected_layout() {
    let (projects, metrics) = fixture();
    let run = AuditRun::new(projects, metrics, config(FailurePolicy::Isolate));
    let outcome = run.execute(instant()).await.unwrap();

    let mut out = Vec::new();
    TextReporter.render(&outcome, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let expected = "\
Target log ingestion for 2024-06-10: 16.7G of 50G monthly

[ERROR] Failed to audit project denied: API error: 403 - permission denied on denied

Skipping project old due to project state DELETE_REQUESTED

Project p1
gce - 9.3G
gke - 8.4G
TOTAL - 17.7G
[WARNING] Current log ingestion of 17.7G is greater than the target value of 16.7G, consider adding log exclusions
";
    assert_eq!(text, expected);
    assert!(!text.contains("idle"));
}

#[tokio::test]
async fn test_json_report_structure() {
    let (projects, metrics) = fixture();
    let run = AuditRun::new(projects, metrics, config(FailurePolicy::Isolate));
    let outcome = run.execute(instant()).await.unwrap();

    let mut out = Vec::new();
    JsonReporter::compact().render(&outcome, &mut out).unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(doc["ceiling_bytes"], 17_895_697_066u64);
    assert_eq!(doc["monthly_cap_bytes"], 53_687_091_200u64);
    assert_eq!(doc["proration_date"], "2024-06-10");

    let reports = doc["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["project_id"], "p1");
    assert_eq!(reports[0]["total_bytes"], 19_000_000_000u64);
    assert_eq!(reports[0]["over_budget"], true);

    let skipped = doc["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0]["project_id"], "old");
    assert_eq!(skipped[0]["reason"], "inactive");
    assert_eq!(skipped[0]["state"], "DELETE_REQUESTED");

    assert_eq!(doc["failed"][0]["project_id"], "denied");
}

#[tokio::test]
async fn test_fail_fast_stops_run() {
    let (projects, metrics) = fixture();
    let run = AuditRun::new(projects, metrics, config(FailurePolicy::FailFast));

    let err = run.execute(instant()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "error getting log usage for project denied: API error: 403 - permission denied on denied"
    );
    assert!(err.partial().is_some());
}

#[tokio::test]
async fn test_fail_fast_partial_outcome_renders() {
    let projects = StaticProjects(vec![
        Project::new("z", LifecycleState::Active),
        Project::new("old", LifecycleState::DeleteRequested),
        Project::new("a", LifecycleState::Active),
    ]);
    let mut samples = HashMap::new();
    samples.insert("a".to_string(), vec![UsageSample::new("a", "gce", 1 << 40)]);

    let config = AuditConfig {
        max_concurrency: 1,
        ..config(FailurePolicy::FailFast)
    };
    let run = AuditRun::new(projects, StaticMetrics(samples), config);

    let err = run.execute(instant()).await.unwrap_err();
    assert!(err.to_string().contains("project z"));

    let partial = err.partial().expect("finished projects are kept");
    assert!(partial.any_over_budget());
    assert_eq!(partial.reports().count(), 1);
    assert_eq!(partial.skipped().count(), 1);
    assert!(!partial.has_failures());

    let mut out = Vec::new();
    TextReporter.render(partial, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Skipping project old due to project state DELETE_REQUESTED"));
    assert!(text.contains("Project a\ngce - 1T"));
    assert!(!text.contains("Project z"));
}

#[tokio::test]
async fn test_shared_sources_through_arc() {
    let (projects, metrics) = fixture();
    let projects = Arc::new(projects);
    let metrics = Arc::new(metrics);

    let run = AuditRun::new(projects.clone(), metrics.clone(), config(FailurePolicy::Isolate));
    let first = run.execute(instant()).await.unwrap();
    let second = run.execute(instant()).await.unwrap();

    assert_eq!(first.projects, second.projects);
}
