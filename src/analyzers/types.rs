//! Data types produced by the analysis pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analyzers::grade::Grade;

/// One student's scores after schema binding, before any derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentScores {
    pub name: String,
    pub math: f64,
    pub science: f64,
    pub english: f64,
}

/// A student row with derived total, average and grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Math")]
    pub math: f64,
    #[serde(rename = "Science")]
    pub science: f64,
    #[serde(rename = "English")]
    pub english: f64,
    #[serde(rename = "Total")]
    pub total: f64,
    #[serde(rename = "Average")]
    pub average: f64,
    #[serde(rename = "Grade")]
    pub grade: Grade,
}

/// Toppers per scoring dimension plus the grade-F students.
///
/// Toppers are `None` only when the dataset has no rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisReport {
    pub math_topper: Option<StudentRecord>,
    pub science_topper: Option<StudentRecord>,
    pub english_topper: Option<StudentRecord>,
    pub overall_topper: Option<StudentRecord>,
    pub weak_students: Vec<StudentRecord>,
}

/// Count of students per grade, iterated in A, B, C, F order.
pub type GradeDistribution = BTreeMap<Grade, usize>;

/// Average score per student, in dataset order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

/// Grade distribution; only grades with at least one student appear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub labels: Vec<Grade>,
    pub counts: Vec<usize>,
}

impl PieChart {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub bar_chart: BarChart,
    pub pie_chart: PieChart,
}

/// Complete result of one analysis call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResult {
    pub records: Vec<StudentRecord>,
    pub report: AnalysisReport,
    pub charts: ChartData,
}
