//! Evaluation instant and metric query window
//!
//! A run captures "now" exactly once as an [`EvaluationInstant`]. Both the
//! proration date and the metric query window derive from it, so a run never
//! reads the clock twice.

use chrono::{DateTime, Duration, Local, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which calendar decides the proration day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProrationClock {
    /// The host's local calendar date
    #[default]
    Local,
    /// The UTC calendar date
    Utc,
}

impl fmt::Display for ProrationClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProrationClock::Local => f.write_str("local"),
            ProrationClock::Utc => f.write_str("utc"),
        }
    }
}

/// The reference instant of one audit run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationInstant(DateTime<Utc>);

impl EvaluationInstant {
    /// Capture the current time
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    /// Calendar date used for proration under the given clock
    pub fn proration_date(&self, clock: ProrationClock) -> NaiveDate {
        match clock {
            ProrationClock::Local => self.0.with_timezone(&Local).date_naive(),
            ProrationClock::Utc => self.0.date_naive(),
        }
    }

    /// Query window of `hours` ending at this instant
    pub fn window(&self, hours: u32) -> QueryWindow {
        QueryWindow {
            start: self.0 - Duration::hours(i64::from(hours)),
            end: self.0,
        }
    }
}

/// Closed time interval for a metric query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QueryWindow {
    /// Start time in RFC 3339, as the monitoring API expects
    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// End time in RFC 3339, as the monitoring API expects
    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
