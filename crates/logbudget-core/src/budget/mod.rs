//! Budget module
//!
//! Derives the prorated ingestion ceiling from a fixed monthly cap.

pub mod calculator;

pub use calculator::{compute_ceiling, days_in_month, BudgetCalculator};
