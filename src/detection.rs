//! Threshold classification for sensor readings.
//!
//! Pure functions: a reading plus a threshold set in, anomaly verdicts out.
//! Inputs are assumed finite — NaN/Infinity behavior is undefined and must
//! be guarded by the caller.

use crate::types::{MetricAnomaly, MetricKey, SensorPoint, Severity, ThresholdConfig};

/// Verdict for a single metric value against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub anomaly: bool,
    pub severity: Option<Severity>,
}

impl Classification {
    const NONE: Classification = Classification {
        anomaly: false,
        severity: None,
    };

    fn some(severity: Severity) -> Self {
        Self {
            anomaly: true,
            severity: Some(severity),
        }
    }
}

/// Classify one metric value against the line's thresholds.
///
/// Evaluation order matters and first match wins: the critical check
/// (outside `[min, max]`) strictly precedes the warning check (inside the
/// buffer strip), so an inverted or overlapping warning zone can never
/// demote a critical value.
pub fn classify(metric: MetricKey, value: f64, thresholds: &ThresholdConfig) -> Classification {
    let target = thresholds.metric(metric);

    if value < target.min || value > target.max {
        return Classification::some(Severity::Critical);
    }

    if value < target.min + target.warning_buffer || value > target.max - target.warning_buffer {
        return Classification::some(Severity::Warning);
    }

    Classification::NONE
}

/// Run [`classify`] over all four metrics of a reading, in the canonical
/// metric order, and collect the non-nominal verdicts.
///
/// The stored `anomalies` field of the input point is ignored — this is the
/// function that produces it.
pub fn detect_anomalies(point: &SensorPoint, thresholds: &ThresholdConfig) -> Vec<MetricAnomaly> {
    MetricKey::ALL
        .iter()
        .filter_map(|&metric| {
            let value = point.metric(metric);
            let verdict = classify(metric, value, thresholds);
            let severity = verdict.severity?;

            let target = thresholds.metric(metric);
            let direction = if value < target.min { "below" } else { "above" };

            Some(MetricAnomaly {
                metric,
                reason: format!(
                    "{} is {} expected range ({}-{})",
                    metric, direction, target.min, target.max
                ),
                severity,
            })
        })
        .collect()
}
