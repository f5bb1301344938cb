//! Authenticated JSON client shared by the Google API clients

use crate::auth::TokenProvider;
use crate::retry::{with_retry, RetryPolicy};
use logbudget_common::SourceError;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default timeout for API requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Build the HTTP client used for API and token requests
pub fn http_client(timeout: Duration) -> Result<Client, SourceError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("logbudget/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SourceError::Config(format!("failed to build HTTP client: {}", e)))
}

#[derive(Clone)]
pub struct RestClient {
    http: Client,
    tokens: Arc<dyn TokenProvider>,
    retry: RetryPolicy,
}

impl RestClient {
    pub fn new(http: Client, tokens: Arc<dyn TokenProvider>, retry: RetryPolicy) -> Self {
        Self {
            http,
            tokens,
            retry,
        }
    }

    /// Authenticated GET, retried on transient failures
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SourceError> {
        let description = format!("GET {}", url.path());
        with_retry(&self.retry, &description, move || self.get_once(url.clone())).await
    }

    async fn get_once<T: DeserializeOwned>(&self, url: Url) -> Result<T, SourceError> {
        let token = self.tokens.access_token().await?;
        debug!(url = %url, "GET request");

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        handle_response(response).await
    }
}

fn transport_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout(e.to_string())
    } else {
        SourceError::Transport(e.to_string())
    }
}

async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, SourceError> {
    let status = response.status();
    let text = response.text().await.map_err(transport_error)?;

    if status.is_success() {
        serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, body = %text, "Failed to parse response");
            SourceError::Decode(e.to_string())
        })
    } else if status == StatusCode::NOT_FOUND {
        Err(SourceError::NotFound(text))
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(SourceError::Auth(text))
    } else {
        Err(SourceError::Api {
            status: status.as_u16(),
            message: text,
        })
    }
}
