//! Report rendering
//!
//! Turns an [`AuditOutcome`] into human-readable text or a JSON document.

pub mod json;
pub mod text;

pub use json::JsonReporter;
pub use text::TextReporter;

use crate::audit::AuditOutcome;
use logbudget_common::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// Renders audit outcomes
pub trait Reporter: Send + Sync {
    fn render(&self, outcome: &AuditOutcome, out: &mut dyn Write) -> Result<()>;
}

/// Output format selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    pub fn reporter(self) -> Box<dyn Reporter> {
        match self {
            ReportFormat::Text => Box::new(TextReporter),
            ReportFormat::Json => Box::new(JsonReporter::default()),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => f.write_str("text"),
            ReportFormat::Json => f.write_str("json"),
        }
    }
}
