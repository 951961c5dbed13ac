//! CLI entry point for the conversion rater tool.
//!
//! Provides subcommands for enriching raw application exports and producing
//! funnel and PV/optimal-CAC aggregate tables by segment.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use conversion_rater::{
    analyzers::format::format_value_table,
    config::PipelineConfig,
    importer::read_applications,
    output::{to_json_pretty, write_table},
    pipeline::Pipeline,
    record::Segment,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "conversion_rater")]
#[command(about = "Conversion-funnel and unit-economics metrics for application pipelines", long_about = None)]
struct Cli {
    /// Optional JSON file overriding pipeline parameters
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and enrich a raw application CSV export
    Enrich {
        /// Path to the application CSV export
        #[arg(value_name = "INPUT")]
        input: String,

        /// CSV file to write the enriched rows to
        #[arg(short, long, default_value = "enriched.csv")]
        output: String,
    },
    /// Compute the conversion-funnel table for a segment
    Funnel {
        /// Path to the application CSV export
        #[arg(value_name = "INPUT")]
        input: String,

        /// Segment column to group by
        #[arg(short, long, value_enum, default_value_t = Segment::Overall)]
        segment: Segment,

        /// Optional CSV file to write the table to (JSON to stdout otherwise)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Compute the PV / optimal-CAC table for a segment
    Cac {
        /// Path to the application CSV export
        #[arg(value_name = "INPUT")]
        input: String,

        /// Segment column to group by
        #[arg(short, long, value_enum, default_value_t = Segment::Overall)]
        segment: Segment,

        /// Render report-ready strings instead of the numeric table
        #[arg(short, long, default_value_t = false)]
        formatted: bool,

        /// Optional CSV file to write the table to (JSON to stdout otherwise)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/conversion_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("conversion_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Enrich { input, output } => {
            let pipeline = build_pipeline(&input, config)?;
            write_table(&output, pipeline.enriched())?;
            info!(
                output,
                rows = pipeline.enriched().len(),
                "Enriched table written"
            );
        }
        Commands::Funnel {
            input,
            segment,
            output,
        } => {
            let mut pipeline = build_pipeline(&input, config)?;
            let table = pipeline.funnel(segment);
            emit(table, output.as_deref())?;
        }
        Commands::Cac {
            input,
            segment,
            formatted,
            output,
        } => {
            let mut pipeline = build_pipeline(&input, config)?;
            let table = pipeline.value(segment);
            if formatted {
                let display = format_value_table(table);
                emit(&display, output.as_deref())?;
            } else {
                emit(table, output.as_deref())?;
            }
        }
    }

    Ok(())
}

/// Reads, validates, and enriches the input CSV, logging every validation
/// failure before bailing.
#[tracing::instrument(skip_all, fields(input))]
fn build_pipeline(input: &str, config: PipelineConfig) -> Result<Pipeline> {
    let records = read_applications(input)?;
    info!(records = records.len(), "Applications imported");

    match Pipeline::from_records(&records, config) {
        Ok(pipeline) => Ok(pipeline),
        Err(errors) => {
            for e in &errors {
                error!(error = %e, "Validation failure");
            }
            bail!("input failed validation with {} error(s)", errors.len());
        }
    }
}

/// Writes a table to CSV when a path is given, pretty JSON to stdout otherwise.
fn emit<T: serde::Serialize>(rows: &[T], output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            write_table(path, rows)?;
            info!(path, rows = rows.len(), "Table written");
        }
        None => println!("{}", to_json_pretty(rows)?),
    }
    Ok(())
}
