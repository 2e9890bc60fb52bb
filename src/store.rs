//! In-memory line telemetry store.
//!
//! Owns the process-wide dataset: per-line reading sequences, the fault
//! event list, and per-line threshold configs. All mutation funnels through
//! [`TelemetryStore::update_thresholds`]; callers that serve concurrent
//! requests wrap the store in a lock so the threshold-update recompute is
//! observed atomically.
//!
//! Unknown line ids are treated as "no data yet", not as errors: queries
//! return empty sequences or the default threshold config.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::detect_anomalies;
use crate::types::{FaultCategory, FaultEvent, LineThresholds, SensorPoint, ThresholdConfig};

// ============================================================================
// Errors
// ============================================================================

/// Errors surfaced by store operations. All are caller mistakes — nothing
/// in the store can fail transiently.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Malformed threshold config (inverted range or negative buffer).
    #[error("invalid threshold config: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Dataset
// ============================================================================

/// Full dataset snapshot, as produced by the generator and dumped by the
/// bulk export endpoint. `BTreeMap` keeps line ids in ascending order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub readings_by_line: BTreeMap<String, Vec<SensorPoint>>,
    pub faults: Vec<FaultEvent>,
    pub thresholds_by_line: BTreeMap<String, ThresholdConfig>,
}

// ============================================================================
// Filters
// ============================================================================

/// Fault log filter. `line_id` matches exactly; the optional bounds apply
/// to `started_at`; `category` is an equality check.
#[derive(Debug, Clone)]
pub struct FaultFilter {
    pub line_id: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub category: Option<FaultCategory>,
}

impl FaultFilter {
    pub fn for_line(line_id: impl Into<String>) -> Self {
        Self {
            line_id: line_id.into(),
            start: None,
            end: None,
            category: None,
        }
    }

    fn matches(&self, fault: &FaultEvent) -> bool {
        if fault.line_id != self.line_id {
            return false;
        }
        if let Some(start) = self.start {
            if fault.started_at < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if fault.started_at > end {
                return false;
            }
        }
        if let Some(category) = self.category {
            if fault.category != category {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// Store
// ============================================================================

/// Owner of the mutable telemetry dataset for the process lifetime.
///
/// The line set is static after construction — there is no line deletion.
#[derive(Debug, Default)]
pub struct TelemetryStore {
    dataset: Dataset,
}

impl TelemetryStore {
    /// Wrap a generated dataset. Reading sequences are sorted by timestamp
    /// on ingest so windowed slicing can rely on strictly increasing order.
    pub fn new(mut dataset: Dataset) -> Self {
        for readings in dataset.readings_by_line.values_mut() {
            readings.sort_by_key(|point| point.timestamp);
        }
        Self { dataset }
    }

    /// Line ids in ascending order.
    pub fn line_ids(&self) -> impl Iterator<Item = &str> {
        self.dataset.readings_by_line.keys().map(String::as_str)
    }

    /// All readings for a line, oldest first. Empty for unknown lines.
    pub fn readings(&self, line_id: &str) -> &[SensorPoint] {
        self.dataset
            .readings_by_line
            .get(line_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Most recent reading for a line, if any.
    pub fn latest_reading(&self, line_id: &str) -> Option<&SensorPoint> {
        self.readings(line_id).last()
    }

    /// Readings with `timestamp >= since`, oldest first.
    ///
    /// Relies on the sorted-order invariant: a partition point search finds
    /// the window start without scanning the whole sequence.
    pub fn series_since(&self, line_id: &str, since: DateTime<Utc>) -> &[SensorPoint] {
        let readings = self.readings(line_id);
        let first = readings.partition_point(|point| point.timestamp < since);
        &readings[first..]
    }

    /// Active thresholds for a line, falling back to the plant defaults for
    /// lines without an explicit config. Never errors.
    pub fn thresholds_for(&self, line_id: &str) -> ThresholdConfig {
        self.dataset
            .thresholds_by_line
            .get(line_id)
            .copied()
            .unwrap_or_default()
    }

    /// Replace a line's threshold config wholesale and reclassify every
    /// stored reading for that line against the new config.
    ///
    /// Synchronous and O(readings-for-line): once this returns, every
    /// subsequent overview or chart query reflects the new classification.
    /// An unknown line id simply records the config — there are no readings
    /// to reclassify yet.
    pub fn update_thresholds(
        &mut self,
        line_id: &str,
        config: ThresholdConfig,
    ) -> Result<LineThresholds, TelemetryError> {
        validate_thresholds(&config)?;

        self.dataset
            .thresholds_by_line
            .insert(line_id.to_string(), config);

        if let Some(readings) = self.dataset.readings_by_line.get_mut(line_id) {
            for point in readings.iter_mut() {
                point.anomalies = detect_anomalies(point, &config);
            }
        }

        Ok(LineThresholds {
            line_id: line_id.to_string(),
            thresholds: config,
        })
    }

    /// Fault events matching the filter, in stored order
    /// (reverse-chronological by convention).
    pub fn faults_matching(&self, filter: &FaultFilter) -> Vec<FaultEvent> {
        self.dataset
            .faults
            .iter()
            .filter(|fault| filter.matches(fault))
            .cloned()
            .collect()
    }

    /// All fault events, in stored order.
    pub fn faults(&self) -> &[FaultEvent] {
        &self.dataset.faults
    }

    /// Faithful dump of the whole dataset.
    pub fn export(&self) -> Dataset {
        self.dataset.clone()
    }
}

/// Reject configs with an inverted range or a negative buffer on any metric.
///
/// The transport layer validates payload shape; this guards the semantic
/// invariants so a bad config can never silently mark every reading
/// critical.
fn validate_thresholds(config: &ThresholdConfig) -> Result<(), TelemetryError> {
    let mut problems = Vec::new();

    for metric in crate::types::MetricKey::ALL {
        let t = config.metric(metric);
        if t.min > t.max {
            problems.push(format!("{}: min ({}) exceeds max ({})", metric, t.min, t.max));
        }
        if t.warning_buffer < 0.0 {
            problems.push(format!(
                "{}: warningBuffer ({}) must be non-negative",
                metric, t.warning_buffer
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(TelemetryError::Validation(problems))
    }
}
