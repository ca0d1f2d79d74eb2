//! Output formatting and persistence for analysis results.
//!
//! Builds the JSON payload served over HTTP, renders the console report,
//! and writes the enriched table to CSV.

use std::fmt::Write as _;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzers::grade::Grade;
use crate::analyzers::types::{AnalysisResult, BarChart, PieChart, StudentRecord};
use crate::analyzers::utility::{mean, pct};

/// Weak-student entry as exposed in `analysis_report.weak_students`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeakStudent {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Average")]
    pub average: f64,
    #[serde(rename = "Grade")]
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub math_topper: Option<String>,
    pub science_topper: Option<String>,
    pub english_topper: Option<String>,
    pub overall_topper: Option<String>,
    pub weak_students: Vec<WeakStudent>,
}

/// JSON document returned by `POST /analyze` and written by `report --json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub dataframe: Vec<StudentRecord>,
    pub analysis_report: ReportPayload,
    pub bar_chart_data: BarChart,
    pub pie_chart_data: PieChart,
}

impl From<&AnalysisResult> for AnalysisPayload {
    fn from(result: &AnalysisResult) -> Self {
        let report = &result.report;
        let subject = |topper: &Option<StudentRecord>, score: fn(&StudentRecord) -> f64| {
            topper.as_ref().map(|r| format!("{} ({})", r.name, score(r)))
        };

        AnalysisPayload {
            dataframe: result.records.clone(),
            analysis_report: ReportPayload {
                math_topper: subject(&report.math_topper, |r| r.math),
                science_topper: subject(&report.science_topper, |r| r.science),
                english_topper: subject(&report.english_topper, |r| r.english),
                overall_topper: report
                    .overall_topper
                    .as_ref()
                    .map(|r| format!("{} (Avg: {})", r.name, r.average)),
                weak_students: report
                    .weak_students
                    .iter()
                    .map(|r| WeakStudent {
                        name: r.name.clone(),
                        average: r.average,
                        grade: r.grade,
                    })
                    .collect(),
            },
            bar_chart_data: result.charts.bar_chart.clone(),
            pie_chart_data: result.charts.pie_chart.clone(),
        }
    }
}

/// Renders the human-readable report printed by the `report` command.
pub fn render_report(result: &AnalysisResult) -> String {
    let mut output = String::new();
    let rule = "=".repeat(40);

    let _ = writeln!(output, "--- Student Performance Report ---");
    if result.records.is_empty() {
        let _ = writeln!(output, "No student records found.");
    } else {
        let width = result
            .records
            .iter()
            .map(|r| r.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Name".len());
        let _ = writeln!(
            output,
            "{:<width$}  {:>7}  {:>7}  {:>7}  {:>7}  {:>7}  {:>5}",
            "Name", "Math", "Science", "English", "Total", "Average", "Grade"
        );
        for r in &result.records {
            let _ = writeln!(
                output,
                "{:<width$}  {:>7}  {:>7}  {:>7}  {:>7}  {:>7.2}  {:>5}",
                r.name, r.math, r.science, r.english, r.total, r.average, r.grade
            );
        }
        let averages: Vec<f64> = result.records.iter().map(|r| r.average).collect();
        let _ = writeln!(output, "Class average: {:.2}", mean(&averages));
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "{rule}");
    let _ = writeln!(output);

    let _ = writeln!(output, "--- Analysis Report ---");
    let report = &result.report;
    match (
        &report.math_topper,
        &report.science_topper,
        &report.english_topper,
        &report.overall_topper,
    ) {
        (Some(math), Some(science), Some(english), Some(overall)) => {
            let _ = writeln!(output, "Math Topper:    {} (Score: {})", math.name, math.math);
            let _ = writeln!(
                output,
                "Science Topper: {} (Score: {})",
                science.name, science.science
            );
            let _ = writeln!(
                output,
                "English Topper: {} (Score: {})",
                english.name, english.english
            );
            let _ = writeln!(
                output,
                "Overall Topper: {} (Total: {}, Avg: {:.2})",
                overall.name, overall.total, overall.average
            );
        }
        _ => {
            let _ = writeln!(output, "No student records to rank.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "--- Students Needing Attention (Grade F) ---");
    if report.weak_students.is_empty() {
        let _ = writeln!(output, "No students received an 'F' grade. Well done!");
    } else {
        for r in &report.weak_students {
            let _ = writeln!(output, "- {} (Average: {:.2}, Grade: {})", r.name, r.average, r.grade);
        }
    }

    let pie = &result.charts.pie_chart;
    if !pie.labels.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "--- Grade Distribution ---");
        let total = pie.total();
        for (grade, count) in pie.labels.iter().zip(&pie.counts) {
            let _ = writeln!(output, "{grade}: {count} ({:.1}%)", pct(*count, total));
        }
    }

    output
}

/// Writes the payload to `path` as pretty-printed JSON.
pub fn write_json(path: &Path, payload: &AnalysisPayload) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, payload)?;
    debug!(path = %path.display(), "JSON report written");
    Ok(())
}

/// Writes every record, including derived columns, to a CSV file.
///
/// Overwrites the file if it already exists.
pub fn write_records(path: &Path, records: &[StudentRecord]) -> Result<()> {
    debug!(path = %path.display(), rows = records.len(), "Writing CSV records");

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::analyzer::analyze;
    use crate::dataset::{Cell, Dataset};
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(name)
    }

    fn sample_result() -> AnalysisResult {
        let row = |name: &str, m: f64, s: f64, e: f64| {
            vec![
                Cell::Text(name.into()),
                Cell::Number(m),
                Cell::Number(s),
                Cell::Number(e),
            ]
        };
        let dataset = Dataset::new(
            vec!["Name".into(), "Math".into(), "Science".into(), "English".into()],
            vec![row("Alice", 90.0, 80.0, 70.0), row("Bob", 50.0, 50.0, 50.0)],
        );
        analyze(&dataset).unwrap()
    }

    #[test]
    fn test_payload_shape() {
        let payload = AnalysisPayload::from(&sample_result());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["analysis_report"]["math_topper"], "Alice (90)");
        assert_eq!(json["analysis_report"]["overall_topper"], "Alice (Avg: 80)");
        assert_eq!(json["analysis_report"]["weak_students"][0]["Name"], "Bob");
        assert_eq!(json["analysis_report"]["weak_students"][0]["Grade"], "F");
        assert_eq!(json["dataframe"][0]["Total"], 240.0);
        assert_eq!(json["dataframe"][1]["Grade"], "F");
        assert_eq!(json["bar_chart_data"]["labels"][1], "Bob");
        assert_eq!(json["bar_chart_data"]["scores"][0], 80.0);
        assert_eq!(json["pie_chart_data"]["labels"], serde_json::json!(["B", "F"]));
        assert_eq!(json["pie_chart_data"]["counts"], serde_json::json!([1, 1]));
    }

    #[test]
    fn test_payload_json_round_trip() {
        let payload = AnalysisPayload::from(&sample_result());
        let text = serde_json::to_string(&payload).unwrap();
        let parsed: AnalysisPayload = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, payload);
    }

    #[test]
    fn test_payload_empty_has_null_toppers() {
        let payload = AnalysisPayload::from(&AnalysisResult::default());
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["analysis_report"]["math_topper"].is_null());
        assert!(json["analysis_report"]["overall_topper"].is_null());
        assert_eq!(json["dataframe"], serde_json::json!([]));
    }

    #[test]
    fn test_render_report() {
        let text = render_report(&sample_result());
        assert!(text.contains("Math Topper:    Alice (Score: 90)"));
        assert!(text.contains("Overall Topper: Alice (Total: 240, Avg: 80.00)"));
        assert!(text.contains("- Bob (Average: 50.00, Grade: F)"));
        assert!(text.contains("B: 1 (50.0%)"));
        assert!(text.contains("Class average: 65.00"));
    }

    #[test]
    fn test_render_report_empty() {
        let text = render_report(&AnalysisResult::default());
        assert!(text.contains("No student records to rank."));
        assert!(text.contains("No students received an 'F' grade. Well done!"));
        assert!(!text.contains("Grade Distribution"));
    }

    #[test]
    fn test_write_records_includes_derived_columns() {
        let path = temp_path("score_rater_test_records.csv");
        let _ = fs::remove_file(&path);

        write_records(&path, &sample_result().records).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "Name,Math,Science,English,Total,Average,Grade");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Alice,"));
        assert!(lines[1].ends_with(",B"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_json_round_trip() {
        let path = temp_path("score_rater_test_payload.json");
        let payload = AnalysisPayload::from(&sample_result());

        write_json(&path, &payload).unwrap();
        let parsed: AnalysisPayload =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, payload);

        fs::remove_file(&path).unwrap();
    }
}
