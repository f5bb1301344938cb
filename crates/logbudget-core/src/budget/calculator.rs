//! Prorated budget ceiling
//!
//! The allowance for "so far this month" grows linearly with the day of the
//! month:
//!
//! ```text
//! ceiling = floor(cap × day / days_in_month)
//! ```
//!
//! Day 1 already grants `cap / days_in_month`, and the last day grants the
//! full cap.

use chrono::{Datelike, NaiveDate};
use logbudget_common::{BudgetError, MonthlyBudget, ProratedCeiling};
use tracing::debug;

/// Number of days in the month containing `date`.
///
/// Computed as the day before the first of the following month, so December
/// rolls into January of the next year and leap Februaries have 29 days.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        // Only unreachable past chrono's last representable year, which ends in December
        .unwrap_or(31)
}

/// Prorate `monthly_cap_bytes` to `today`, truncating to whole bytes.
pub fn compute_ceiling(monthly_cap_bytes: u64, today: NaiveDate) -> u64 {
    let current_day = today.day();
    let last_day = days_in_month(today);

    if current_day >= last_day {
        return monthly_cap_bytes;
    }

    let fraction = f64::from(current_day) / f64::from(last_day);
    // The float product can round above the cap for very large caps
    ((monthly_cap_bytes as f64 * fraction) as u64).min(monthly_cap_bytes)
}

/// Derives the prorated ceiling for a fixed monthly budget
#[derive(Debug, Clone, Copy)]
pub struct BudgetCalculator {
    budget: MonthlyBudget,
}

impl BudgetCalculator {
    pub fn new(budget: MonthlyBudget) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> MonthlyBudget {
        self.budget
    }

    /// Ceiling for the given calendar date
    pub fn ceiling_for(&self, today: NaiveDate) -> ProratedCeiling {
        let bytes = compute_ceiling(self.budget.cap_bytes(), today);
        debug!(
            cap_bytes = self.budget.cap_bytes(),
            %today,
            ceiling_bytes = bytes,
            "Computed prorated ceiling"
        );
        ProratedCeiling::new(bytes, today)
    }

    /// Ceiling for a date given as components
    ///
    /// # Errors
    /// Returns [`BudgetError::InvalidInput`] when the components do not form a
    /// calendar date.
    pub fn ceiling_for_ymd(
        &self,
        year: i32,
        month: u32,
        day: u32,
    ) -> Result<ProratedCeiling, BudgetError> {
        let today = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            BudgetError::InvalidInput(format!(
                "{year:04}-{month:02}-{day:02} is not a valid calendar date"
            ))
        })?;
        Ok(self.ceiling_for(today))
    }
}
