//! GCE metadata server tokens

use super::{AccessToken, TokenFetcher, TokenResponse, SCOPES};
use async_trait::async_trait;
use chrono::Utc;
use logbudget_common::SourceError;
use reqwest::Client;

pub const DEFAULT_METADATA_URL: &str = "http://metadata.google.internal";

/// Overrides the metadata server host, as the Google SDKs do
pub const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";

const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Fetches tokens for the default service account of the running instance
pub struct MetadataServer {
    http: Client,
    base_url: String,
}

impl MetadataServer {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Metadata base URL, honouring `GCE_METADATA_HOST`
pub fn metadata_url() -> String {
    std::env::var(METADATA_HOST_ENV)
        .map(|host| format!("http://{}", host))
        .unwrap_or_else(|_| DEFAULT_METADATA_URL.to_string())
}

#[async_trait]
impl TokenFetcher for MetadataServer {
    async fn fetch(&self) -> Result<AccessToken, SourceError> {
        let url = format!("{}{}", self.base_url, TOKEN_PATH);
        let scopes = SCOPES.join(",");

        let response = self
            .http
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .query(&[("scopes", scopes.as_str())])
            .send()
            .await
            .map_err(|e| {
                SourceError::Auth(format!(
                    "no credentials found and the metadata server is unreachable: {}",
                    e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Auth(format!(
                "metadata server returned {}",
                status
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(format!("invalid metadata token: {}", e)))?;
        Ok(token.into_access_token(Utc::now()))
    }
}
