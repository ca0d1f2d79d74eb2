use crate::analyzers::grade::{Grade, grade};
use crate::analyzers::types::{
    AnalysisReport, BarChart, ChartData, GradeDistribution, PieChart, StudentRecord,
    StudentScores,
};
use crate::analyzers::utility::{first_max_by, round2};

/// Adds total, rounded average and grade to one student's scores.
pub fn derive_record(scores: StudentScores) -> StudentRecord {
    let total = scores.math + scores.science + scores.english;
    let average = round2(total / 3.0);

    StudentRecord {
        name: scores.name,
        math: scores.math,
        science: scores.science,
        english: scores.english,
        total,
        average,
        grade: grade(average),
    }
}

/// Finds the toppers for each subject and overall, plus every grade-F student.
pub fn build_report(records: &[StudentRecord]) -> AnalysisReport {
    let topper = |key: fn(&StudentRecord) -> f64| {
        first_max_by(records, key).map(|i| records[i].clone())
    };

    AnalysisReport {
        math_topper: topper(|r| r.math),
        science_topper: topper(|r| r.science),
        english_topper: topper(|r| r.english),
        overall_topper: topper(|r| r.total),
        weak_students: records
            .iter()
            .filter(|r| r.grade == Grade::F)
            .cloned()
            .collect(),
    }
}

/// Counts students per grade; grades nobody received are left out.
pub fn grade_distribution(records: &[StudentRecord]) -> GradeDistribution {
    let mut counts = GradeDistribution::new();
    for record in records {
        *counts.entry(record.grade).or_default() += 1;
    }
    counts
}

pub fn build_chart_data(records: &[StudentRecord]) -> ChartData {
    let bar_chart = BarChart {
        labels: records.iter().map(|r| r.name.clone()).collect(),
        scores: records.iter().map(|r| r.average).collect(),
    };

    let (labels, counts) = grade_distribution(records).into_iter().unzip();

    ChartData {
        bar_chart,
        pie_chart: PieChart { labels, counts },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(name: &str, math: f64, science: f64, english: f64) -> StudentScores {
        StudentScores {
            name: name.to_string(),
            math,
            science,
            english,
        }
    }

    #[test]
    fn test_derive_record() {
        let record = derive_record(scores("Alice", 90.0, 80.0, 70.0));
        assert_eq!(record.total, 240.0);
        assert_eq!(record.average, 80.0);
        assert_eq!(record.grade, Grade::B);
    }

    #[test]
    fn test_derive_record_rounds_before_grading() {
        // 269.99 / 3 = 89.996..., which rounds up into the A band.
        let record = derive_record(scores("Cara", 89.99, 90.0, 90.0));
        assert_eq!(record.average, 90.0);
        assert_eq!(record.grade, Grade::A);

        let record = derive_record(scores("Dev", 89.0, 90.0, 90.0));
        assert_eq!(record.average, 89.67);
        assert_eq!(record.grade, Grade::B);
    }

    #[test]
    fn test_report_tie_break_keeps_first() {
        let records = vec![
            derive_record(scores("Ann", 95.0, 60.0, 60.0)),
            derive_record(scores("Ben", 95.0, 99.0, 99.0)),
        ];
        let report = build_report(&records);
        assert_eq!(report.math_topper.unwrap().name, "Ann");
        assert_eq!(report.science_topper.unwrap().name, "Ben");
        assert_eq!(report.overall_topper.unwrap().name, "Ben");
    }

    #[test]
    fn test_report_empty() {
        let report = build_report(&[]);
        assert_eq!(report, AnalysisReport::default());
    }

    #[test]
    fn test_weak_students_keep_dataset_order() {
        let records = vec![
            derive_record(scores("Zed", 10.0, 10.0, 10.0)),
            derive_record(scores("Amy", 95.0, 95.0, 95.0)),
            derive_record(scores("Bo", 40.0, 40.0, 40.0)),
        ];
        let names: Vec<_> = build_report(&records)
            .weak_students
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Zed", "Bo"]);
    }

    #[test]
    fn test_chart_data_orders() {
        let records = vec![
            derive_record(scores("Zed", 10.0, 10.0, 10.0)),
            derive_record(scores("Amy", 95.0, 95.0, 95.0)),
            derive_record(scores("Bo", 40.0, 40.0, 40.0)),
            derive_record(scores("Cy", 70.0, 60.0, 65.0)),
        ];
        let charts = build_chart_data(&records);

        assert_eq!(charts.bar_chart.labels, vec!["Zed", "Amy", "Bo", "Cy"]);
        assert_eq!(charts.bar_chart.scores, vec![10.0, 95.0, 40.0, 65.0]);
        assert_eq!(charts.pie_chart.labels, vec![Grade::A, Grade::C, Grade::F]);
        assert_eq!(charts.pie_chart.counts, vec![1, 1, 2]);
        assert_eq!(charts.pie_chart.total(), 4);
    }
}
