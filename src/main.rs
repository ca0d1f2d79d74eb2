//! CLI entry point for the score rater.
//!
//! `report` analyzes a CSV/XLSX file (local or remote), prints the report and
//! renders the charts. `serve` exposes the same analysis over HTTP.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use score_rater::analyzers::analyzer::analyze;
use score_rater::charts::{ChartFormat, render_all};
use score_rater::config::ServerConfig;
use score_rater::fetch::read_source;
use score_rater::output::{AnalysisPayload, render_report, write_json, write_records};
use score_rater::parser::{DataFormat, parse_dataset};
use score_rater::server::AnalysisServer;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "score_rater")]
#[command(about = "Grade student score sheets and find toppers and students at risk", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a score sheet and print the report
    Report {
        /// Path or URL of a .csv or .xlsx file
        #[arg(value_name = "FILE_OR_URL", default_value = "students.csv")]
        source: String,

        /// Directory the charts are written to
        #[arg(short, long, default_value = "charts")]
        charts_dir: PathBuf,

        /// Image format for the charts
        #[arg(short, long, value_enum, default_value_t = ChartFormat::Png)]
        format: ChartFormat,

        /// Skip chart rendering
        #[arg(long, default_value_t = false)]
        no_charts: bool,

        /// Write the graded table (with Total, Average, Grade) to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the JSON payload served by `serve` to this file
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Serve the analysis over HTTP at POST /analyze
    Serve {
        /// Address to bind (overrides SCORE_RATER_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            source,
            charts_dir,
            format,
            no_charts,
            output,
            json,
        } => {
            let outcome =
                run_report(&source, &charts_dir, format, no_charts, output, json).await;
            if let Err(e) = outcome {
                error!(error = %e, source = %source, "Report failed");
                return Err(e);
            }
        }
        Commands::Serve { host, port } => {
            let config = ServerConfig::from_env()?.with_overrides(host, port);
            AnalysisServer::new(config).run().await?;
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_tracing() -> WorkerGuard {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/score_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("score_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", "info"));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", "debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    file_guard
}

fn env_filter(var: &str, default: &str) -> EnvFilter {
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Loads, analyzes and reports on one score sheet.
#[tracing::instrument(skip_all, fields(source = %source))]
async fn run_report(
    source: &str,
    charts_dir: &Path,
    format: ChartFormat,
    no_charts: bool,
    output: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<()> {
    let data_format = DataFormat::detect(source)?;
    let bytes = read_source(source).await?;
    let dataset = parse_dataset(&bytes, data_format)?;
    let result = analyze(&dataset)?;

    println!("Generated {}", Local::now().format("%Y-%m-%d %H:%M"));
    println!("{}", render_report(&result));

    if let Some(path) = output {
        write_records(&path, &result.records)?;
        info!(path = %path.display(), "Graded table written");
    }

    if let Some(path) = json {
        write_json(&path, &AnalysisPayload::from(&result))?;
        info!(path = %path.display(), "JSON payload written");
    }

    if !no_charts {
        let written = render_all(&result.charts, charts_dir, format)
            .with_context(|| format!("failed to render charts into {}", charts_dir.display()))?;
        for path in written {
            println!("Chart saved to {}", path.display());
        }
    }

    println!("--- Analysis Complete ---");
    Ok(())
}
