//! Resource Manager v1 wire types

use logbudget_common::{LifecycleState, Project};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProjectsResponse {
    #[serde(default)]
    pub projects: Vec<ProjectResource>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResource {
    pub project_id: String,
    #[serde(default)]
    pub lifecycle_state: LifecycleState,
}

impl From<ProjectResource> for Project {
    fn from(resource: ProjectResource) -> Self {
        Project::new(resource.project_id, resource.lifecycle_state)
    }
}
