//! Error types for logbudget
//!
//! Provides a unified error type and the per-concern error variants

use thiserror::Error;

/// Result type alias using LogBudgetError
pub type Result<T> = std::result::Result<T, LogBudgetError>;

/// Unified error type for logbudget operations
#[derive(Debug, Error)]
pub enum LogBudgetError {
    // Budget computation errors
    #[error("invalid monthly cap: {0}")]
    Budget(#[from] BudgetError),

    // Collaborator errors (project listing, metric queries, auth)
    #[error("error getting list of projects: {0}")]
    ProjectListing(#[source] SourceError),

    #[error("error getting log usage for project {project_id}: {source}")]
    ProjectUsage {
        project_id: String,
        #[source]
        source: SourceError,
    },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Report rendering errors
    #[error("Report error: {0}")]
    Report(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Contract violations when deriving a budget
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ByteSizeError> for BudgetError {
    fn from(err: ByteSizeError) -> Self {
        BudgetError::InvalidInput(err.to_string())
    }
}

/// Errors parsing a human byte quantity such as `50G`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ByteSizeError {
    #[error("byte quantity is empty")]
    Empty,

    #[error("byte quantity {0:?} has no unit (expected one of B, K, M, G, T, P, E)")]
    MissingUnit(String),

    #[error("byte quantity {0:?} has an unknown unit")]
    UnknownUnit(String),

    #[error("byte quantity {0:?} is not a valid number")]
    InvalidNumber(String),

    #[error("byte quantity {0:?} must not be negative")]
    Negative(String),
}

/// Failures reported by the project and metric collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SourceError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Transport(_) | SourceError::Timeout(_) => true,
            SourceError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for LogBudgetError {
    fn from(err: serde_json::Error) -> Self {
        LogBudgetError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for LogBudgetError {
    fn from(err: std::io::Error) -> Self {
        LogBudgetError::Report(err.to_string())
    }
}
