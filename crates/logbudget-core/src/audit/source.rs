//! Collaborator traits
//!
//! The auditor never talks to a cloud API directly. Project enumeration and
//! metric retrieval sit behind these traits so the orchestration can run
//! against real clients or test doubles.

use async_trait::async_trait;
use logbudget_common::{Project, QueryWindow, SourceError, UsageSample};
use std::sync::Arc;

/// Enumerates the projects of an organization
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// List every visible project with its lifecycle state
    async fn list_projects(&self) -> Result<Vec<Project>, SourceError>;
}

/// Fetches ingestion series for a project
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// One sample per (resource type) series observed in `window`
    async fn fetch_ingestion_samples(
        &self,
        project_id: &str,
        window: &QueryWindow,
    ) -> Result<Vec<UsageSample>, SourceError>;
}

#[async_trait]
impl<T: ProjectSource + ?Sized> ProjectSource for Arc<T> {
    async fn list_projects(&self) -> Result<Vec<Project>, SourceError> {
        (**self).list_projects().await
    }
}

#[async_trait]
impl<T: MetricSource + ?Sized> MetricSource for Arc<T> {
    async fn fetch_ingestion_samples(
        &self,
        project_id: &str,
        window: &QueryWindow,
    ) -> Result<Vec<UsageSample>, SourceError> {
        (**self).fetch_ingestion_samples(project_id, window).await
    }
}
