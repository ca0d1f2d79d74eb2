use tracing::debug;

use crate::analyzers::aggregate::{build_chart_data, build_report, derive_record};
use crate::analyzers::schema::Schema;
use crate::analyzers::types::{AnalysisResult, StudentRecord};
use crate::dataset::Dataset;
use crate::error::AnalysisError;

/// Runs the full analysis over one dataset.
///
/// The required columns are checked before any row is read, so a dataset
/// missing `Name`, `Math`, `Science` or `English` fails with
/// [`AnalysisError::Validation`] and nothing else is computed. Rows whose
/// name or score cells cannot be read fail with [`AnalysisError::Load`].
///
/// An empty dataset is not an error: every topper is `None` and all lists
/// are empty.
#[tracing::instrument(skip_all, fields(rows = dataset.len()))]
pub fn analyze(dataset: &Dataset) -> Result<AnalysisResult, AnalysisError> {
    let schema = Schema::resolve(dataset)?;

    let records = dataset
        .rows
        .iter()
        .enumerate()
        .map(|(i, cells)| schema.bind(i + 1, cells).map(derive_record))
        .collect::<Result<Vec<StudentRecord>, _>>()?;

    let report = build_report(&records);
    let charts = build_chart_data(&records);

    debug!(
        records = records.len(),
        weak_students = report.weak_students.len(),
        grades = charts.pie_chart.labels.len(),
        "Analysis complete"
    );

    Ok(AnalysisResult {
        records,
        report,
        charts,
    })
}
