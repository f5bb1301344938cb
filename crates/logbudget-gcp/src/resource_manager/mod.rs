//! Project listing through the Cloud Resource Manager API

pub mod models;

use crate::client::RestClient;
use async_trait::async_trait;
use logbudget_common::{Project, SourceError};
use logbudget_core::ProjectSource;
use models::ListProjectsResponse;
use tracing::{debug, info, instrument};
use url::Url;

#[derive(Clone)]
pub struct ResourceManagerClient {
    rest: RestClient,
    base_url: String,
}

impl ResourceManagerClient {
    pub fn new(rest: RestClient, base_url: &str) -> Self {
        Self {
            rest,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn page_url(&self, page_token: Option<&str>) -> Result<Url, SourceError> {
        let mut url = Url::parse(&format!("{}/v1/projects", self.base_url))
            .map_err(|e| SourceError::Config(format!("invalid resource manager URL: {}", e)))?;
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair("pageToken", token);
        }
        Ok(url)
    }
}

#[async_trait]
impl ProjectSource for ResourceManagerClient {
    #[instrument(skip(self))]
    async fn list_projects(&self) -> Result<Vec<Project>, SourceError> {
        let mut projects = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let url = self.page_url(page_token.as_deref())?;
            let page: ListProjectsResponse = self.rest.get_json(url).await?;
            pages += 1;

            debug!(page = pages, count = page.projects.len(), "Received project page");
            projects.extend(page.projects.into_iter().map(Project::from));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!(count = projects.len(), pages, "Listed projects");
        Ok(projects)
    }
}
