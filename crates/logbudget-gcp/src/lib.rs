//! Google Cloud collaborators for logbudget
//!
//! Implements the project and metric sources against the Resource Manager
//! and Cloud Monitoring REST APIs:
//! - Credential discovery and token caching
//! - Project listing with pagination
//! - Ingested-bytes time series queries
//! - Retry of transient failures

pub mod auth;
pub mod client;
pub mod monitoring;
pub mod resource_manager;
pub mod retry;

pub use auth::{StaticToken, TokenProvider};
pub use client::RestClient;
pub use monitoring::MonitoringClient;
pub use resource_manager::ResourceManagerClient;
pub use retry::RetryPolicy;

use logbudget_common::SourceError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_RESOURCE_MANAGER_URL: &str = "https://cloudresourcemanager.googleapis.com";
pub const DEFAULT_MONITORING_URL: &str = "https://monitoring.googleapis.com";

/// Base URLs of the Google endpoints in use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcpEndpoints {
    pub resource_manager: String,
    pub monitoring: String,
    pub oauth_token: String,
    pub metadata: String,
}

impl Default for GcpEndpoints {
    fn default() -> Self {
        Self {
            resource_manager: DEFAULT_RESOURCE_MANAGER_URL.to_string(),
            monitoring: DEFAULT_MONITORING_URL.to_string(),
            oauth_token: auth::credentials::DEFAULT_TOKEN_URI.to_string(),
            metadata: auth::metadata::metadata_url(),
        }
    }
}

/// Everything needed to reach Google Cloud
#[derive(Debug, Clone)]
pub struct GcpSettings {
    /// Bypasses credential discovery when set
    pub access_token: Option<String>,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub endpoints: GcpEndpoints,
}

impl Default for GcpSettings {
    fn default() -> Self {
        Self {
            access_token: None,
            request_timeout: Duration::from_secs(client::DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            endpoints: GcpEndpoints::default(),
        }
    }
}

/// Resolve credentials and build both API clients
pub async fn connect(
    settings: &GcpSettings,
) -> Result<(ResourceManagerClient, MonitoringClient), SourceError> {
    let http = client::http_client(settings.request_timeout)?;
    let tokens = auth::discover(&http, settings.access_token.as_deref(), &settings.endpoints).await?;
    Ok(clients(http, tokens, settings))
}

/// Build both API clients from an existing token provider
pub fn clients(
    http: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
    settings: &GcpSettings,
) -> (ResourceManagerClient, MonitoringClient) {
    let rest = RestClient::new(http, tokens, settings.retry);
    (
        ResourceManagerClient::new(rest.clone(), &settings.endpoints.resource_manager),
        MonitoringClient::new(rest, &settings.endpoints.monitoring),
    )
}
