//! CSV export of the synthetic dataset.
//!
//! Builds the same dataset the server would and writes it to two files:
//! `sensor_readings.csv` (one row per reading) and `fault_events.csv`
//! (one row per fault). Useful for offline analysis and spreadsheet review.
//!
//! # Usage
//! ```bash
//! cargo run --bin export-csv -- --out ./data/generated --seed 42
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::Parser;

use linesight::config::AppConfig;
use linesight::generator::build_dataset;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "export-csv")]
#[command(about = "Export the synthetic telemetry dataset to CSV files")]
#[command(version)]
struct Args {
    /// Output directory for the CSV files
    #[arg(short, long, default_value = "./data/generated")]
    out: PathBuf,

    /// Dataset seed (default from config)
    #[arg(long)]
    seed: Option<u64>,

    /// Days of fabricated history (default from config)
    #[arg(long)]
    history_days: Option<i64>,
}

// ============================================================================
// CSV Helpers
// ============================================================================

/// Quote a field if it contains a comma or a quote.
fn csv_escape(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

fn csv_row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| csv_escape(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load();
    if let Some(seed) = args.seed {
        config.generator.seed = seed;
    }
    if let Some(days) = args.history_days {
        config.generator.history_days = days;
    }
    config.validate().context("Invalid configuration")?;

    let calendar = config.calendar();
    let dataset = build_dataset(&config.generator_settings(), &calendar, Utc::now());

    fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create output directory {}", args.out.display()))?;

    // --- sensor_readings.csv ---
    let mut readings_lines = vec![
        "line_id,timestamp,throughput,temperature,pressure,energy,anomaly_count".to_string(),
    ];
    for (line_id, points) in &dataset.readings_by_line {
        for point in points {
            readings_lines.push(csv_row(&[
                line_id.clone(),
                point
                    .timestamp
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
                point.throughput.to_string(),
                point.temperature.to_string(),
                point.pressure.to_string(),
                point.energy.to_string(),
                point.anomalies.len().to_string(),
            ]));
        }
    }
    let readings_path = args.out.join("sensor_readings.csv");
    fs::write(&readings_path, readings_lines.join("\n"))
        .with_context(|| format!("Failed to write {}", readings_path.display()))?;

    // --- fault_events.csv ---
    let mut fault_lines = vec![
        "fault_id,line_id,started_at,ended_at,fault_type,category,severity,resolution_status,duration_minutes"
            .to_string(),
    ];
    for fault in &dataset.faults {
        fault_lines.push(csv_row(&[
            fault.id.clone(),
            fault.line_id.clone(),
            fault
                .started_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            fault
                .ended_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_default(),
            fault.fault_type.clone(),
            format!("{:?}", fault.category).to_lowercase(),
            format!("{:?}", fault.severity).to_lowercase(),
            format!("{:?}", fault.resolution_status).to_lowercase(),
            fault.duration_minutes.to_string(),
        ]));
    }
    let faults_path = args.out.join("fault_events.csv");
    fs::write(&faults_path, fault_lines.join("\n"))
        .with_context(|| format!("Failed to write {}", faults_path.display()))?;

    println!("CSV exports written to {}", args.out.display());
    Ok(())
}
