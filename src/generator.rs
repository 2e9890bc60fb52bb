//! Synthetic dataset generator.
//!
//! Fabricates a plausible month of plant history at startup: per-line
//! threshold variation, 15-minute readings modulated by shift and weekend
//! effects, rare injected fault spikes, and fault events derived from
//! critical readings. Everything is seeded so two runs with the same
//! settings produce the same dataset.
//!
//! Only the output contract matters to the rest of the system: ordered
//! timestamped readings per line, a reverse-chronological fault list, and a
//! threshold config per line.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use rand::prelude::*;
use rand_distr::Normal;

use crate::detection::detect_anomalies;
use crate::shifts::ShiftCalendar;
use crate::store::Dataset;
use crate::types::{
    FaultCategory, FaultEvent, FaultSeverity, ResolutionStatus, SensorPoint, Severity,
    ThresholdConfig,
};

// ============================================================================
// Baseline Constants
// ============================================================================

/// Baseline throughput (units/hour).
const BASE_THROUGHPUT: f64 = 92.0;
/// Baseline hall temperature (°C).
const BASE_TEMPERATURE: f64 = 32.0;
/// Baseline pneumatic pressure (bar).
const BASE_PRESSURE: f64 = 6.6;
/// Baseline energy draw (kWh).
const BASE_ENERGY: f64 = 300.0;

/// Chance per reading of an injected fault spike.
const SPIKE_PROBABILITY: f64 = 0.009;
/// Chance that a critical reading emits a fault event.
const FAULT_EMISSION_PROBABILITY: f64 = 0.06;

/// Stream salts so the three generation passes draw independent sequences
/// from one configured seed.
const THRESHOLD_STREAM: u64 = 99;
const READING_STREAM: u64 = 7;
const FAULT_STREAM: u64 = 23;

// ============================================================================
// Settings
// ============================================================================

/// Knobs for the dataset builder, sourced from the runtime config.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorSettings {
    /// Number of production lines (LINE-01 .. LINE-NN).
    pub line_count: usize,
    /// Days of history to fabricate, ending at `now`.
    pub history_days: i64,
    /// Minutes between consecutive readings.
    pub interval_minutes: i64,
    /// Base seed; the three generation passes derive their streams from it.
    pub seed: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            line_count: 20,
            history_days: 30,
            interval_minutes: 15,
            seed: 42,
        }
    }
}

/// `LINE-01` .. `LINE-NN` naming.
pub fn line_id_from_index(index: usize) -> String {
    format!("LINE-{:02}", index + 1)
}

fn stream(seed: u64, salt: u64) -> StdRng {
    StdRng::seed_from_u64(seed.rotate_left(8) ^ salt)
}

/// Centered uniform jitter in [-0.5, 0.5).
fn jitter(rng: &mut StdRng) -> f64 {
    rng.gen::<f64>() - 0.5
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Dataset Assembly
// ============================================================================

/// Build the full startup dataset: thresholds, readings, faults.
pub fn build_dataset(
    settings: &GeneratorSettings,
    calendar: &ShiftCalendar,
    now: DateTime<Utc>,
) -> Dataset {
    let thresholds_by_line = generate_thresholds(settings);
    let readings_by_line = generate_readings(settings, calendar, now, &thresholds_by_line);
    let faults = generate_faults(settings, &readings_by_line);

    Dataset {
        readings_by_line,
        faults,
        thresholds_by_line,
    }
}

/// Per-line threshold sets: plant defaults with a small per-line drift on
/// the throughput band and the energy ceiling.
fn generate_thresholds(
    settings: &GeneratorSettings,
) -> std::collections::BTreeMap<String, ThresholdConfig> {
    let mut rng = stream(settings.seed, THRESHOLD_STREAM);

    (0..settings.line_count)
        .map(|index| {
            let variation = jitter(&mut rng) * 6.0;
            let mut config = ThresholdConfig::default();
            config.throughput.min = round2(config.throughput.min + variation);
            config.throughput.max = round2(config.throughput.max + variation);
            config.energy.max = round2(config.energy.max + variation * 2.0);
            (line_id_from_index(index), config)
        })
        .collect()
}

fn shift_multiplier(local_hour: u32) -> f64 {
    match local_hour {
        6..=13 => 1.06,
        14..=21 => 1.0,
        _ => 0.93,
    }
}

fn generate_readings(
    settings: &GeneratorSettings,
    calendar: &ShiftCalendar,
    now: DateTime<Utc>,
    thresholds_by_line: &std::collections::BTreeMap<String, ThresholdConfig>,
) -> std::collections::BTreeMap<String, Vec<SensorPoint>> {
    let mut rng = stream(settings.seed, READING_STREAM);
    let unit_noise = Normal::new(0.0, 1.0).expect("unit normal parameters are valid");

    // Anchor the series to a whole hour so chart ticks line up.
    let start = (now - Duration::days(settings.history_days))
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    let mut readings_by_line = std::collections::BTreeMap::new();

    for index in 0..settings.line_count {
        let line_id = line_id_from_index(index);
        let thresholds = thresholds_by_line
            .get(&line_id)
            .copied()
            .unwrap_or_default();
        let line_factor = 1.0 + (index % 5) as f64 * 0.015;

        let mut points = Vec::new();
        let mut ts = start;
        while ts < now {
            let local = ts.with_timezone(&calendar.offset());
            let hour = local.hour();
            let multiplier = shift_multiplier(hour);
            let weekend_penalty = match local.weekday() {
                Weekday::Sat | Weekday::Sun => -5.0,
                _ => 0.0,
            };
            let afternoon_heat = if (12..=16).contains(&hour) { 3.0 } else { 0.0 };

            let mut throughput = BASE_THROUGHPUT * multiplier * line_factor
                + unit_noise.sample(&mut rng) * 2.4
                + weekend_penalty;
            let mut temperature =
                BASE_TEMPERATURE + unit_noise.sample(&mut rng) * 2.0 + afternoon_heat;
            let mut pressure = BASE_PRESSURE + unit_noise.sample(&mut rng) * 0.35;
            let mut energy = BASE_ENERGY * multiplier * line_factor
                + unit_noise.sample(&mut rng) * 10.5
                + if throughput < thresholds.throughput.min {
                    18.0
                } else {
                    0.0
                };

            // Rare spike: throughput collapses while temperature and energy
            // climb — the raw material for fault events downstream.
            if rng.gen::<f64>() < SPIKE_PROBABILITY {
                throughput -= 8.0 + rng.gen::<f64>() * 20.0;
                temperature += 5.0 + rng.gen::<f64>() * 10.0;
                pressure -= 0.6 + rng.gen::<f64>() * 1.2;
                energy += 20.0 + rng.gen::<f64>() * 40.0;
            }

            let mut point = SensorPoint {
                timestamp: ts,
                throughput: round2(throughput),
                temperature: round2(temperature),
                pressure: round2(pressure),
                energy: round2(energy),
                anomalies: Vec::new(),
            };
            point.anomalies = detect_anomalies(&point, &thresholds);
            points.push(point);

            ts += Duration::minutes(settings.interval_minutes);
        }

        readings_by_line.insert(line_id, points);
    }

    readings_by_line
}

fn fault_type_for(category: FaultCategory) -> &'static str {
    match category {
        FaultCategory::Mechanical => "Conveyor drag",
        FaultCategory::Electrical => "Drive overload",
        FaultCategory::Quality => "Seal variance",
        FaultCategory::Utility => "Compressed air drop",
    }
}

/// Derive fault events from critical readings: a small fraction of critical
/// points each spawn one fault. The list comes back reverse-chronological,
/// which is the order the fault log serves.
fn generate_faults(
    settings: &GeneratorSettings,
    readings_by_line: &std::collections::BTreeMap<String, Vec<SensorPoint>>,
) -> Vec<FaultEvent> {
    let mut rng = stream(settings.seed, FAULT_STREAM);
    const CATEGORIES: [FaultCategory; 4] = [
        FaultCategory::Mechanical,
        FaultCategory::Electrical,
        FaultCategory::Quality,
        FaultCategory::Utility,
    ];
    const SEVERITIES: [FaultSeverity; 3] =
        [FaultSeverity::Low, FaultSeverity::Medium, FaultSeverity::High];

    let mut faults = Vec::new();

    for (line_id, points) in readings_by_line {
        for (idx, point) in points.iter().enumerate() {
            let has_critical = point
                .anomalies
                .iter()
                .any(|a| a.severity == Severity::Critical);
            if !has_critical || rng.gen::<f64>() >= FAULT_EMISSION_PROBABILITY {
                continue;
            }

            let duration_minutes = (8.0 + rng.gen::<f64>() * 70.0).round().max(5.0) as u32;
            let category_idx =
                ((rng.gen::<f64>() * CATEGORIES.len() as f64) as usize).min(CATEGORIES.len() - 1);
            let category = CATEGORIES[category_idx];
            let severity_idx =
                ((rng.gen::<f64>() * SEVERITIES.len() as f64) as usize).min(SEVERITIES.len() - 1);
            let severity = SEVERITIES[severity_idx];

            faults.push(FaultEvent {
                id: format!("{line_id}-FLT-{idx}"),
                line_id: line_id.clone(),
                started_at: point.timestamp,
                ended_at: Some(point.timestamp + Duration::minutes(i64::from(duration_minutes))),
                fault_type: fault_type_for(category).to_string(),
                category,
                severity,
                resolution_status: if rng.gen::<f64>() > 0.12 {
                    ResolutionStatus::Resolved
                } else {
                    ResolutionStatus::Open
                },
                duration_minutes,
            });
        }
    }

    faults.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    faults
}
