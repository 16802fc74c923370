// Cleaning limits command-line entry point
//
// Loads the input tables, runs the carryover calculation, and prints the
// requested report view to stdout. Logs go to stderr.

use anyhow::{anyhow, Context};
use cleaning_validation::{
    CalculationPolicy, CarryoverCalculator, CleaningReport, InputBundle, JsonFormatter, MarkdownFormatter,
    ReportView,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportFormat {
    Markdown,
    Json,
}

fn parse_format(value: &str) -> anyhow::Result<ReportFormat> {
    match value.trim().to_lowercase().as_str() {
        "markdown" | "md" => Ok(ReportFormat::Markdown),
        "json" => Ok(ReportFormat::Json),
        other => Err(anyhow!("unknown REPORT_FORMAT '{}' (expected markdown or json)", other)),
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cleaning_validation=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Configuration from environment variables
    let data_dir = PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data/example".to_string()));
    let input_json = std::env::var("INPUT_JSON").ok().map(PathBuf::from);
    let policy_file = std::env::var("POLICY_FILE").ok().map(PathBuf::from);
    let format = parse_format(&std::env::var("REPORT_FORMAT").unwrap_or_else(|_| "markdown".to_string()))?;
    let view: ReportView = std::env::var("REPORT_VIEW")
        .unwrap_or_else(|_| "all".to_string())
        .parse()
        .map_err(|e: String| anyhow!(e))?;

    tracing::info!("Configuration:");
    tracing::info!("  DATA_DIR: {}", data_dir.display());
    tracing::info!(
        "  POLICY_FILE: {}",
        policy_file.as_ref().map_or_else(|| "(defaults)".to_string(), |p| p.display().to_string())
    );
    tracing::info!("  REPORT_FORMAT: {:?}", format);
    tracing::info!("  REPORT_VIEW: {:?}", view);

    let policy = match &policy_file {
        Some(path) => CalculationPolicy::load(path)?,
        None => CalculationPolicy::default(),
    };
    let calculator = CarryoverCalculator::new(policy).context("Invalid calculation policy")?;

    // A JSON bundle takes precedence over the CSV directory
    let (input, source) = match &input_json {
        Some(path) => (InputBundle::load_json(path)?, path),
        None => (InputBundle::load(&data_dir)?, &data_dir),
    };
    let limits = calculator
        .run(&input)
        .with_context(|| format!("Calculation failed for {}", source.display()))?;

    let report = CleaningReport::from_limits(&limits);
    let output = match format {
        ReportFormat::Markdown => MarkdownFormatter::format(&report, view),
        ReportFormat::Json => JsonFormatter::format(&report, view)?,
    };
    println!("{}", output);

    Ok(())
}
