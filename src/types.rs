//! Domain types for line telemetry.
//!
//! Closed enumerations (metric keys, severities, statuses, shift names) are
//! modeled as exhaustively-matched sum types so new categories cannot fall
//! through the classifier or the aggregator silently. Wire names follow the
//! dashboard API (camelCase).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Metric Keys
// ============================================================================

/// The four metrics every production line reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKey {
    Throughput,
    Temperature,
    Pressure,
    Energy,
}

impl MetricKey {
    /// Canonical evaluation order. Anomaly output preserves this order.
    pub const ALL: [MetricKey; 4] = [
        MetricKey::Throughput,
        MetricKey::Temperature,
        MetricKey::Pressure,
        MetricKey::Energy,
    ];
}

impl std::fmt::Display for MetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricKey::Throughput => write!(f, "throughput"),
            MetricKey::Temperature => write!(f, "temperature"),
            MetricKey::Pressure => write!(f, "pressure"),
            MetricKey::Energy => write!(f, "energy"),
        }
    }
}

// ============================================================================
// Severities and Statuses
// ============================================================================

/// Severity of a single metric anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

/// Rolled-up status of a production line, derived from its latest reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    Nominal,
    Warning,
    Critical,
}

impl LineStatus {
    /// Sort rank for overview listings: critical lines surface first.
    pub fn rank(self) -> u8 {
        match self {
            LineStatus::Critical => 0,
            LineStatus::Warning => 1,
            LineStatus::Nominal => 2,
        }
    }
}

impl std::fmt::Display for LineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineStatus::Nominal => write!(f, "nominal"),
            LineStatus::Warning => write!(f, "warning"),
            LineStatus::Critical => write!(f, "critical"),
        }
    }
}

// ============================================================================
// Thresholds
// ============================================================================

/// Acceptable range and warning margin for one metric.
///
/// The critical zone is `value < min || value > max`; the warning zone is
/// the buffer strip just inside either bound. A buffer large enough to make
/// the two strips overlap is permitted — classification order (critical
/// first) decides, not zone disjointness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricThreshold {
    pub min: f64,
    pub max: f64,
    pub warning_buffer: f64,
}

impl MetricThreshold {
    pub const fn new(min: f64, max: f64, warning_buffer: f64) -> Self {
        Self {
            min,
            max,
            warning_buffer,
        }
    }
}

/// Per-line threshold set, one entry per metric. Replaced wholesale on
/// update — there is no partial merge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub throughput: MetricThreshold,
    pub temperature: MetricThreshold,
    pub pressure: MetricThreshold,
    pub energy: MetricThreshold,
}

impl ThresholdConfig {
    pub fn metric(&self, key: MetricKey) -> &MetricThreshold {
        match key {
            MetricKey::Throughput => &self.throughput,
            MetricKey::Temperature => &self.temperature,
            MetricKey::Pressure => &self.pressure,
            MetricKey::Energy => &self.energy,
        }
    }
}

impl Default for ThresholdConfig {
    /// Plant-standard defaults, used for any line without an explicit config.
    fn default() -> Self {
        Self {
            throughput: MetricThreshold::new(72.0, 120.0, 6.0),
            temperature: MetricThreshold::new(20.0, 46.0, 4.0),
            pressure: MetricThreshold::new(4.5, 8.7, 0.7),
            energy: MetricThreshold::new(220.0, 390.0, 24.0),
        }
    }
}

/// Threshold config tagged with its line, as served by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineThresholds {
    pub line_id: String,
    pub thresholds: ThresholdConfig,
}

// ============================================================================
// Readings and Anomalies
// ============================================================================

/// One out-of-range metric on a reading. Never stored on its own — always
/// attached to the `SensorPoint` that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAnomaly {
    pub metric: MetricKey,
    pub reason: String,
    pub severity: Severity,
}

/// One timestamped snapshot of the four line metrics.
///
/// The metric values are immutable once generated; only `anomalies` is
/// replaced in place when a line's thresholds change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorPoint {
    pub timestamp: DateTime<Utc>,
    pub throughput: f64,
    pub temperature: f64,
    pub pressure: f64,
    pub energy: f64,
    pub anomalies: Vec<MetricAnomaly>,
}

impl SensorPoint {
    pub fn metric(&self, key: MetricKey) -> f64 {
        match key {
            MetricKey::Throughput => self.throughput,
            MetricKey::Temperature => self.temperature,
            MetricKey::Pressure => self.pressure,
            MetricKey::Energy => self.energy,
        }
    }
}

// ============================================================================
// Fault Events
// ============================================================================

/// Category of a recorded downtime/quality incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultCategory {
    Mechanical,
    Electrical,
    Quality,
    Utility,
}

impl std::str::FromStr for FaultCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mechanical" => Ok(FaultCategory::Mechanical),
            "electrical" => Ok(FaultCategory::Electrical),
            "quality" => Ok(FaultCategory::Quality),
            "utility" => Ok(FaultCategory::Utility),
            _ => Err(()),
        }
    }
}

/// Operator-facing severity of a fault event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultSeverity {
    Low,
    Medium,
    High,
}

/// Whether a fault has been closed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    Open,
    Resolved,
}

/// A discrete downtime/quality incident on a line. Append-only; threshold
/// changes never touch fault events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultEvent {
    pub id: String,
    pub line_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub fault_type: String,
    pub category: FaultCategory,
    pub severity: FaultSeverity,
    pub resolution_status: ResolutionStatus,
    pub duration_minutes: u32,
}

// ============================================================================
// Derived Views
// ============================================================================

/// Snapshot of one line for the overview grid. Recomputed on every query,
/// never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineOverview {
    pub line_id: String,
    pub throughput_rate: f64,
    pub oee: f64,
    pub status: LineStatus,
    pub downtime_minutes: u32,
    pub fault_count: usize,
    pub last_updated: DateTime<Utc>,
}

/// Aggregates for one 8-hour shift on one line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSummary {
    pub line_id: String,
    pub shift_name: ShiftName,
    pub shift_date: NaiveDate,
    pub timezone: String,
    pub avg_throughput: f64,
    pub avg_oee: f64,
    pub downtime_minutes: u32,
    pub fault_count: usize,
}

// ============================================================================
// Time Windows and Shifts
// ============================================================================

/// Ad-hoc query window for timeseries endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Hour,
    Shift,
    Day,
    Week,
}

impl std::str::FromStr for TimeWindow {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(TimeWindow::Hour),
            "shift" => Ok(TimeWindow::Shift),
            "day" => Ok(TimeWindow::Day),
            "week" => Ok(TimeWindow::Week),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeWindow::Hour => write!(f, "hour"),
            TimeWindow::Shift => write!(f, "shift"),
            TimeWindow::Day => write!(f, "day"),
            TimeWindow::Week => write!(f, "week"),
        }
    }
}

/// The three fixed 8-hour operating shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftName {
    #[serde(rename = "Shift A")]
    A,
    #[serde(rename = "Shift B")]
    B,
    #[serde(rename = "Shift C")]
    C,
}

impl std::fmt::Display for ShiftName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftName::A => write!(f, "Shift A"),
            ShiftName::B => write!(f, "Shift B"),
            ShiftName::C => write!(f, "Shift C"),
        }
    }
}
