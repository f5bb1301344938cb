//! Budget Types - monthly cap and its prorated ceiling
//!
//! A [`MonthlyBudget`] is fixed for the whole calendar month. The
//! [`ProratedCeiling`] is the part of it that may be consumed up to a given
//! day and is recomputed on every run.

use crate::error::BudgetError;
use crate::units::{format_bytes, parse_bytes};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Total bytes of log ingestion allowed per calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBudget {
    cap_bytes: u64,
}

impl MonthlyBudget {
    pub const fn new(cap_bytes: u64) -> Self {
        Self { cap_bytes }
    }

    /// Parse a human cap such as `50G`
    pub fn parse(cap: &str) -> Result<Self, BudgetError> {
        Ok(Self::new(parse_bytes(cap)?))
    }

    pub const fn cap_bytes(&self) -> u64 {
        self.cap_bytes
    }
}

impl FromStr for MonthlyBudget {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MonthlyBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_bytes(self.cap_bytes))
    }
}

/// Ingestion allowance for the month so far, as of `date`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProratedCeiling {
    bytes: u64,
    date: NaiveDate,
}

impl ProratedCeiling {
    pub const fn new(bytes: u64, date: NaiveDate) -> Self {
        Self { bytes, date }
    }

    pub const fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Calendar date the ceiling was prorated for
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Whether a usage total is strictly above the ceiling
    pub const fn is_exceeded_by(&self, total_bytes: u64) -> bool {
        total_bytes > self.bytes
    }
}

impl fmt::Display for ProratedCeiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_bytes(self.bytes))
    }
}
