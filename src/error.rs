//! Error taxonomy shared by the loader and the analyzer.

use thiserror::Error;

/// The dataset was readable but lacks one or more required columns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "File must contain 'Name', 'Math', 'Science', and 'English' columns (missing: {})",
    quoted(.missing)
)]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

fn quoted(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failures while decoding an input file into a dataset, including score
/// cells that cannot be read as numbers.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file type '{0}', expected .csv or .xlsx")]
    UnsupportedFormat(String),

    #[error("could not read CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("row {row}: missing student name")]
    MissingName { row: usize },

    #[error("row {row}: column '{column}' has non-numeric score '{value}'")]
    InvalidScore {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// Everything [`crate::analyzers::analyzer::analyze`] can fail with.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Load(#[from] LoadError),
}
