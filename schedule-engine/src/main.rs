use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use schedule_engine::calendar::{CalendarFrame, CalendarNormalizer};
use schedule_engine::domain::{Referential, ReferentialData};
use schedule_engine::validation::{ValidationConfig, ValidationReport, Validator};

/// Normalize the calendar of a dataset and validate its schedules.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON dataset: a `calendar` frame next to the referential collections
    #[arg(long, value_name = "*.json")]
    dataset: PathBuf,

    /// JSON validation parameters; missing fields take their defaults
    #[arg(long, value_name = "*.json")]
    config: Option<PathBuf>,

    /// Validate the dataset on its own, without network-wide checks
    #[arg(long)]
    standalone: bool,

    /// Date used for timetables with no dates at all [default: today]
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Keep explicit date lists instead of rewriting them as weekly patterns
    #[arg(long)]
    no_compression: bool,

    #[arg(long, value_enum, default_value_t = Format::Summary)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// One JSON diagnostic per line
    JsonLines,
    /// Checkpoint statuses and counts
    Summary,
}

#[derive(Deserialize)]
struct Dataset {
    #[serde(default)]
    calendar: CalendarFrame,
    #[serde(flatten)]
    referential: ReferentialData,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let raw = fs::read_to_string(&args.dataset)
        .with_context(|| format!("failed to read {}", args.dataset.display()))?;
    let dataset: Dataset = serde_json::from_str(&raw)
        .with_context(|| format!("invalid dataset {}", args.dataset.display()))?;

    let mut config = match &args.config {
        Some(path) => ValidationConfig::from_path(path)?,
        None => ValidationConfig::default(),
    };
    config.standalone |= args.standalone;

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let mut normalizer = CalendarNormalizer::new(today);
    if args.no_compression {
        normalizer = normalizer.without_compression();
    }
    let calendar = normalizer
        .normalize(&dataset.calendar)
        .context("calendar normalization failed")?;
    for warning in &calendar.warnings {
        eprintln!("calendar: {warning}");
    }

    let mut referential = Referential::from(dataset.referential);
    referential.attach_timetables(calendar.into_timetables());

    let mut report = ValidationReport::new();
    let summary = Validator::new(config).validate(&referential, &mut report)?;

    match args.format {
        Format::JsonLines => {
            for diagnostic in report.diagnostics() {
                println!("{}", serde_json::to_string(diagnostic)?);
            }
        }
        Format::Summary => {
            println!(
                "{}: {} journeys, {} interchanges: {} errors, {} warnings, {} infos",
                referential.codespace(),
                summary.journeys,
                summary.interchanges,
                summary.errors,
                summary.warnings,
                summary.infos
            );
            for (code, status) in report.summary() {
                println!("  {code:<28} {status}");
            }
        }
    }

    if report.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
