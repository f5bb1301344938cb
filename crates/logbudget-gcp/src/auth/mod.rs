//! Google credentials
//!
//! Credentials are located the way Application Default Credentials are:
//!
//! 1. an explicitly configured access token
//! 2. the file named by `GOOGLE_APPLICATION_CREDENTIALS`
//! 3. gcloud's well-known `application_default_credentials.json`
//! 4. the GCE metadata server
//!
//! Fetched tokens are cached until shortly before they expire.

pub mod credentials;
pub mod metadata;

pub use credentials::{AuthorizedUserCredentials, CredentialsFile, ServiceAccountKey};
pub use metadata::MetadataServer;

use crate::GcpEndpoints;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use logbudget_common::SourceError;
use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Environment variable naming a credentials file
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// OAuth scopes needed to read monitoring data and list projects
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/monitoring",
    "https://www.googleapis.com/auth/cloud-platform.read-only",
];

/// Refresh tokens this long before they expire
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Supplies bearer tokens for API requests
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, SourceError>;
}

/// An OAuth access token and its expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub secret: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now
    }
}

/// Token endpoint response shared by every OAuth flow
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

impl TokenResponse {
    pub(crate) fn into_access_token(self, now: DateTime<Utc>) -> AccessToken {
        AccessToken {
            secret: self.access_token,
            expires_at: now + Duration::seconds(self.expires_in),
        }
    }
}

/// A source of fresh access tokens
#[async_trait]
pub trait TokenFetcher: Send + Sync {
    async fn fetch(&self) -> Result<AccessToken, SourceError>;
}

/// A token that never changes, e.g. from `gcloud auth print-access-token`
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, SourceError> {
        Ok(self.0.clone())
    }
}

/// Caches tokens from a [`TokenFetcher`] until they near expiry
pub struct CachedToken<F> {
    fetcher: F,
    cached: Mutex<Option<AccessToken>>,
}

impl<F: TokenFetcher> CachedToken<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            cached: Mutex::new(None),
        }
    }

    fn fresh(&self) -> Option<String> {
        let now = Utc::now();
        self.cached
            .lock()
            .as_ref()
            .filter(|token| token.is_fresh(now))
            .map(|token| token.secret.clone())
    }
}

#[async_trait]
impl<F: TokenFetcher> TokenProvider for CachedToken<F> {
    async fn access_token(&self) -> Result<String, SourceError> {
        if let Some(secret) = self.fresh() {
            return Ok(secret);
        }

        let token = self.fetcher.fetch().await?;
        debug!(expires_at = %token.expires_at, "Fetched access token");
        let secret = token.secret.clone();
        *self.cached.lock() = Some(token);
        Ok(secret)
    }
}

/// Where credentials come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Static(String),
    File(PathBuf),
    MetadataServer,
}

/// Pick a credential source in ADC order.
///
/// `well_known` is only used when it exists on disk.
pub fn locate(
    explicit_token: Option<&str>,
    env_path: Option<PathBuf>,
    well_known: Option<PathBuf>,
) -> CredentialSource {
    if let Some(token) = explicit_token.filter(|t| !t.is_empty()) {
        return CredentialSource::Static(token.to_string());
    }
    if let Some(path) = env_path {
        return CredentialSource::File(path);
    }
    match well_known {
        Some(path) if path.is_file() => CredentialSource::File(path),
        _ => CredentialSource::MetadataServer,
    }
}

/// gcloud's application default credentials file for this user
pub fn well_known_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("CLOUDSDK_CONFIG") {
        return Some(PathBuf::from(dir).join("application_default_credentials.json"));
    }

    let config_dir = if cfg!(windows) {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    } else {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config"))
    };

    config_dir.map(|dir| dir.join("gcloud").join("application_default_credentials.json"))
}

/// Build a token provider from a credentials file
pub async fn from_file(
    http: &Client,
    path: &Path,
    endpoints: &GcpEndpoints,
) -> Result<Arc<dyn TokenProvider>, SourceError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        SourceError::Config(format!(
            "failed to read credentials file {}: {}",
            path.display(),
            e
        ))
    })?;

    let file: CredentialsFile = serde_json::from_str(&content).map_err(|e| {
        SourceError::Config(format!(
            "unsupported credentials file {}: {}",
            path.display(),
            e
        ))
    })?;

    let provider: Arc<dyn TokenProvider> = match file {
        CredentialsFile::ServiceAccount(key) => {
            info!(client_email = %key.client_email, "Using service account credentials");
            Arc::new(CachedToken::new(key.into_fetcher(http.clone())?))
        }
        CredentialsFile::AuthorizedUser(user) => {
            info!("Using authorized user credentials");
            Arc::new(CachedToken::new(
                user.into_fetcher(http.clone(), endpoints.oauth_token.clone()),
            ))
        }
    };
    Ok(provider)
}

/// Resolve credentials from configuration and the environment
pub async fn discover(
    http: &Client,
    explicit_token: Option<&str>,
    endpoints: &GcpEndpoints,
) -> Result<Arc<dyn TokenProvider>, SourceError> {
    let env_path = std::env::var(CREDENTIALS_ENV).ok().map(PathBuf::from);

    match locate(explicit_token, env_path, well_known_path()) {
        CredentialSource::Static(token) => {
            info!("Using configured access token");
            Ok(Arc::new(StaticToken::new(token)))
        }
        CredentialSource::File(path) => {
            debug!(path = %path.display(), "Loading credentials file");
            from_file(http, &path, endpoints).await
        }
        CredentialSource::MetadataServer => {
            info!("No credentials file found, using the metadata server");
            Ok(Arc::new(CachedToken::new(MetadataServer::new(
                http.clone(),
                endpoints.metadata.clone(),
            ))))
        }
    }
}
