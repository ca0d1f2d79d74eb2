//! Student score analysis and grading.
//!
//! This module validates the input columns, computes per-student totals and
//! averages, assigns letter grades, finds subject toppers and students at
//! risk, and prepares the data behind the bar and pie charts.

pub mod aggregate;
pub mod analyzer;
pub mod grade;
pub mod schema;
pub mod types;
pub mod utility;
