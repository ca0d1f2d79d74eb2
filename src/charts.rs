//! Chart rendering for the `report` command.
//!
//! Draws the per-student average bar chart and the grade distribution pie
//! chart to PNG or SVG files.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::ValueEnum;
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use tracing::{info, warn};

use crate::analyzers::grade::Grade;
use crate::analyzers::types::{BarChart, ChartData, PieChart};
use crate::analyzers::utility::pct;

const BAR_SIZE: (u32, u32) = (1200, 600);
const PIE_SIZE: (u32, u32) = (700, 700);

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartFormat {
    Png,
    Svg,
}

impl ChartFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Svg => "svg",
        }
    }
}

/// Fixed slice color per grade.
pub fn grade_color(grade: Grade) -> RGBColor {
    match grade {
        Grade::A => RGBColor(255, 215, 0),   // gold
        Grade::B => RGBColor(144, 238, 144), // light green
        Grade::C => RGBColor(135, 206, 250), // light sky blue
        Grade::F => RGBColor(240, 128, 128), // light coral
    }
}

/// Slice label per grade with its share of students, e.g. `B (50.0%)`.
pub fn slice_labels(chart: &PieChart) -> Vec<String> {
    let total = chart.total();
    chart
        .labels
        .iter()
        .zip(&chart.counts)
        .map(|(grade, count)| format!("{grade} ({:.1}%)", pct(*count, total)))
        .collect()
}

/// Renders both charts into `dir`, returning the written paths.
///
/// Nothing is drawn for an empty dataset.
pub fn render_all(charts: &ChartData, dir: &Path, format: ChartFormat) -> Result<Vec<PathBuf>> {
    if charts.bar_chart.labels.is_empty() {
        warn!("No student records, skipping charts");
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(dir)?;

    let bar_path = dir.join(format!("average_scores.{}", format.extension()));
    render_bar_chart(&charts.bar_chart, &bar_path, format)?;
    info!(path = %bar_path.display(), "Bar chart written");

    let pie_path = dir.join(format!("grade_distribution.{}", format.extension()));
    render_pie_chart(&charts.pie_chart, &pie_path, format)?;
    info!(path = %pie_path.display(), "Pie chart written");

    Ok(vec![bar_path, pie_path])
}

pub fn render_bar_chart(chart: &BarChart, path: &Path, format: ChartFormat) -> Result<()> {
    match format {
        ChartFormat::Png => {
            draw_bar_chart(&BitMapBackend::new(path, BAR_SIZE).into_drawing_area(), chart)
        }
        ChartFormat::Svg => {
            draw_bar_chart(&SVGBackend::new(path, BAR_SIZE).into_drawing_area(), chart)
        }
    }
}

pub fn render_pie_chart(chart: &PieChart, path: &Path, format: ChartFormat) -> Result<()> {
    match format {
        ChartFormat::Png => {
            draw_pie_chart(&BitMapBackend::new(path, PIE_SIZE).into_drawing_area(), chart)
        }
        ChartFormat::Svg => {
            draw_pie_chart(&SVGBackend::new(path, PIE_SIZE).into_drawing_area(), chart)
        }
    }
}

fn draw_bar_chart<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, data: &BarChart) -> Result<()> {
    root.fill(&WHITE).map_err(|e| anyhow!("Chart fill error: {e}"))?;

    let y_max = data.scores.iter().copied().fold(100.0, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption("Average Score per Student", ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(100)
        .y_label_area_size(50)
        .build_cartesian_2d((0..data.labels.len()).into_segmented(), 0f64..y_max)
        .map_err(|e| anyhow!("Chart build error: {e}"))?;

    let label = |x: &SegmentValue<usize>| match x {
        SegmentValue::CenterOf(i) => data.labels.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(data.labels.len())
        .x_label_formatter(&label)
        .x_label_style(
            ("sans-serif", 12)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .x_desc("Student Name")
        .y_desc("Average Score")
        .draw()
        .map_err(|e| anyhow!("Grid draw error: {e}"))?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(SKY_BLUE.filled())
                .margin(8)
                .data(data.scores.iter().enumerate().map(|(i, score)| (i, *score))),
        )
        .map_err(|e| anyhow!("Bar series error: {e}"))?;

    root.present().map_err(|e| anyhow!("Present error: {e}"))?;
    Ok(())
}

fn draw_pie_chart<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, data: &PieChart) -> Result<()> {
    root.fill(&WHITE).map_err(|e| anyhow!("Chart fill error: {e}"))?;
    let area = root
        .titled("Distribution of Student Grades", ("sans-serif", 30))
        .map_err(|e| anyhow!("Chart title error: {e}"))?;

    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.35;

    let sizes: Vec<f64> = data.counts.iter().map(|c| *c as f64).collect();
    let colors: Vec<RGBColor> = data.labels.iter().map(|g| grade_color(*g)).collect();
    let labels = slice_labels(data);

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(140.0);
    pie.label_style(("sans-serif", 22).into_font().color(&BLACK));

    area.draw(&pie).map_err(|e| anyhow!("Pie draw error: {e}"))?;
    root.present().map_err(|e| anyhow!("Present error: {e}"))?;
    Ok(())
}
