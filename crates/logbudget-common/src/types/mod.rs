//! Core data types for logbudget

pub mod budget;
pub mod project;
pub mod sample;
pub mod time;
