//! Line-overview and shift-summary aggregation.
//!
//! Derived views are recomputed on every query — nothing here is cached.
//! Every function takes an explicit `now`/reference instant so callers (and
//! tests) control the clock.

use chrono::{DateTime, Utc};

use crate::shifts::ShiftCalendar;
use crate::store::{FaultFilter, TelemetryStore};
use crate::types::{LineOverview, LineStatus, SensorPoint, Severity, ShiftSummary};

/// Trailing reading count feeding the OEE proxy.
const OEE_WINDOW_POINTS: usize = 16;

/// The OEE figure is a synthetic proxy: mean throughput scaled by a fixed
/// divisor and clamped to a plausible display band. It is NOT a real
/// availability x performance x quality calculation and is kept only for
/// dashboard continuity.
const OEE_DIVISOR: f64 = 1.15;
const OEE_FLOOR: f64 = 58.0;
const OEE_CEILING: f64 = 99.9;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn oee_proxy(mean_throughput: f64) -> f64 {
    round1((mean_throughput / OEE_DIVISOR).clamp(OEE_FLOOR, OEE_CEILING))
}

/// Status of a line is carried entirely by its latest reading: any critical
/// anomaly wins, then any warning, else nominal.
fn status_from_point(point: &SensorPoint) -> LineStatus {
    if point
        .anomalies
        .iter()
        .any(|a| a.severity == Severity::Critical)
    {
        return LineStatus::Critical;
    }
    if point
        .anomalies
        .iter()
        .any(|a| a.severity == Severity::Warning)
    {
        return LineStatus::Warning;
    }
    LineStatus::Nominal
}

/// Overview snapshot for one line at `now`.
///
/// A line with no readings yet gets a zeroed nominal overview stamped with
/// `now` — unknown lines are "no data", not errors. Downtime and fault
/// count cover faults that started since the current shift began.
pub fn line_overview(
    store: &TelemetryStore,
    calendar: &ShiftCalendar,
    line_id: &str,
    now: DateTime<Utc>,
) -> LineOverview {
    let Some(latest) = store.latest_reading(line_id) else {
        return LineOverview {
            line_id: line_id.to_string(),
            throughput_rate: 0.0,
            oee: 0.0,
            status: LineStatus::Nominal,
            downtime_minutes: 0,
            fault_count: 0,
            last_updated: now,
        };
    };

    let readings = store.readings(line_id);
    let tail = &readings[readings.len().saturating_sub(OEE_WINDOW_POINTS)..];
    let mean_throughput = tail.iter().map(|p| p.throughput).sum::<f64>() / tail.len() as f64;

    let shift_start = calendar.shift_window_for(now).start;
    let mut filter = FaultFilter::for_line(line_id);
    filter.start = Some(shift_start);
    let shift_faults = store.faults_matching(&filter);

    LineOverview {
        line_id: line_id.to_string(),
        throughput_rate: round2(latest.throughput),
        oee: oee_proxy(mean_throughput),
        status: status_from_point(latest),
        downtime_minutes: shift_faults.iter().map(|f| f.duration_minutes).sum(),
        fault_count: shift_faults.len(),
        last_updated: latest.timestamp,
    }
}

/// Overview snapshots for every line in the store, in id order.
pub fn all_overviews(
    store: &TelemetryStore,
    calendar: &ShiftCalendar,
    now: DateTime<Utc>,
) -> Vec<LineOverview> {
    store
        .line_ids()
        .map(|line_id| line_overview(store, calendar, line_id, now))
        .collect()
}

/// Sort overviews for listing: critical first, then warning, then nominal;
/// equal statuses order by line id ascending. The sort is stable.
///
/// The dashboard tile grid renders this order directly — both sides of the
/// API rely on it, tie-break included.
pub fn overviews_sorted_by_status(mut overviews: Vec<LineOverview>) -> Vec<LineOverview> {
    overviews.sort_by(|a, b| {
        a.status
            .rank()
            .cmp(&b.status.rank())
            .then_with(|| a.line_id.cmp(&b.line_id))
    });
    overviews
}

/// Aggregates for the shift containing the reference instant.
///
/// Readings and faults are filtered to the half-open 8-hour window; the
/// mean throughput of an empty window is 0, which the clamped OEE proxy
/// turns into its floor value.
pub fn shift_summary(
    store: &TelemetryStore,
    calendar: &ShiftCalendar,
    line_id: &str,
    reference: DateTime<Utc>,
) -> ShiftSummary {
    let shift_name = calendar.shift_name_for(reference);
    let window = calendar.shift_window_for(reference);

    let points: Vec<&SensorPoint> = store
        .readings(line_id)
        .iter()
        .filter(|point| window.contains(point.timestamp))
        .collect();

    let avg_throughput = if points.is_empty() {
        0.0
    } else {
        points.iter().map(|p| p.throughput).sum::<f64>() / points.len() as f64
    };

    let mut filter = FaultFilter::for_line(line_id);
    filter.start = Some(window.start);
    let shift_faults: Vec<_> = store
        .faults_matching(&filter)
        .into_iter()
        .filter(|fault| fault.started_at < window.end)
        .collect();

    ShiftSummary {
        line_id: line_id.to_string(),
        shift_name,
        shift_date: calendar.local_date(window.start),
        timezone: calendar.timezone_name().to_string(),
        avg_throughput: round2(avg_throughput),
        avg_oee: oee_proxy(avg_throughput),
        downtime_minutes: shift_faults.iter().map(|f| f.duration_minutes).sum(),
        fault_count: shift_faults.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Dataset;
    use crate::types::{
        FaultCategory, FaultEvent, FaultSeverity, MetricAnomaly, MetricKey, ResolutionStatus,
        ShiftName, ThresholdConfig,
    };
    use chrono::{Duration, FixedOffset, NaiveDate, TimeZone};

    fn calendar() -> ShiftCalendar {
        ShiftCalendar::default()
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn reading(timestamp: DateTime<Utc>, throughput: f64) -> SensorPoint {
        SensorPoint {
            timestamp,
            throughput,
            temperature: 32.0,
            pressure: 6.5,
            energy: 300.0,
            anomalies: Vec::new(),
        }
    }

    fn critical_reading(timestamp: DateTime<Utc>, throughput: f64) -> SensorPoint {
        let mut point = reading(timestamp, throughput);
        point.anomalies = vec![MetricAnomaly {
            metric: MetricKey::Throughput,
            reason: "throughput is below expected range (72-120)".to_string(),
            severity: Severity::Critical,
        }];
        point
    }

    fn fault(line_id: &str, started_at: DateTime<Utc>, duration_minutes: u32) -> FaultEvent {
        FaultEvent {
            id: format!("{line_id}-FLT-{}", started_at.timestamp()),
            line_id: line_id.to_string(),
            started_at,
            ended_at: Some(started_at + Duration::minutes(i64::from(duration_minutes))),
            fault_type: "Drive overload".to_string(),
            category: FaultCategory::Electrical,
            severity: FaultSeverity::High,
            resolution_status: ResolutionStatus::Open,
            duration_minutes,
        }
    }

    fn store_with(
        line_id: &str,
        readings: Vec<SensorPoint>,
        faults: Vec<FaultEvent>,
    ) -> TelemetryStore {
        let mut dataset = Dataset::default();
        dataset
            .readings_by_line
            .insert(line_id.to_string(), readings);
        dataset
            .thresholds_by_line
            .insert(line_id.to_string(), ThresholdConfig::default());
        dataset.faults = faults;
        TelemetryStore::new(dataset)
    }

    #[test]
    fn test_overview_for_empty_line_is_zeroed_nominal() {
        let store = TelemetryStore::default();
        let now = local(2026, 3, 10, 10, 0);

        let overview = line_overview(&store, &calendar(), "LINE-05", now);

        assert_eq!(overview.line_id, "LINE-05");
        assert_eq!(overview.throughput_rate, 0.0);
        assert_eq!(overview.oee, 0.0);
        assert_eq!(overview.status, LineStatus::Nominal);
        assert_eq!(overview.downtime_minutes, 0);
        assert_eq!(overview.fault_count, 0);
        assert_eq!(overview.last_updated, now);
    }

    #[test]
    fn test_overview_uses_latest_point_for_rate_and_status() {
        let now = local(2026, 3, 10, 10, 0);
        let store = store_with(
            "LINE-01",
            vec![
                critical_reading(local(2026, 3, 10, 8, 0), 60.0),
                reading(local(2026, 3, 10, 9, 0), 95.456),
            ],
            vec![],
        );

        let overview = line_overview(&store, &calendar(), "LINE-01", now);

        // The earlier critical point does not matter — only the latest.
        assert_eq!(overview.status, LineStatus::Nominal);
        assert_eq!(overview.throughput_rate, 95.46);
        assert_eq!(overview.last_updated, local(2026, 3, 10, 9, 0));
    }

    #[test]
    fn test_overview_oee_is_clamped_and_rounded() {
        let now = local(2026, 3, 10, 10, 0);

        // Mean throughput 115 → 100.0 before clamping → ceiling.
        let high = store_with(
            "LINE-01",
            vec![reading(local(2026, 3, 10, 9, 0), 115.0)],
            vec![],
        );
        assert_eq!(
            line_overview(&high, &calendar(), "LINE-01", now).oee,
            99.9
        );

        // Mean throughput 40 → ~34.8 before clamping → floor.
        let low = store_with(
            "LINE-01",
            vec![reading(local(2026, 3, 10, 9, 0), 40.0)],
            vec![],
        );
        assert_eq!(line_overview(&low, &calendar(), "LINE-01", now).oee, 58.0);
    }

    #[test]
    fn test_overview_oee_window_is_last_16_points() {
        let now = local(2026, 3, 10, 12, 0);
        let mut readings = Vec::new();
        // 10 old low points followed by 16 points at 103.5: only the tail
        // should feed the proxy (103.5 / 1.15 = 90.0 exactly).
        for i in 0..10 {
            readings.push(reading(local(2026, 3, 10, 6, 0) + Duration::minutes(i * 5), 10.0));
        }
        for i in 0..16 {
            readings.push(reading(
                local(2026, 3, 10, 8, 0) + Duration::minutes(i * 5),
                103.5,
            ));
        }
        let store = store_with("LINE-01", readings, vec![]);

        assert_eq!(line_overview(&store, &calendar(), "LINE-01", now).oee, 90.0);
    }

    #[test]
    fn test_overview_counts_faults_since_shift_start() {
        let now = local(2026, 3, 10, 10, 0); // Shift A, started 06:00
        let store = store_with(
            "LINE-01",
            vec![reading(local(2026, 3, 10, 9, 0), 95.0)],
            vec![
                fault("LINE-01", local(2026, 3, 10, 7, 0), 30),
                fault("LINE-01", local(2026, 3, 10, 8, 30), 12),
                // Before the shift started — excluded.
                fault("LINE-01", local(2026, 3, 10, 5, 0), 45),
                // Different line — excluded.
                fault("LINE-02", local(2026, 3, 10, 7, 30), 60),
            ],
        );

        let overview = line_overview(&store, &calendar(), "LINE-01", now);
        assert_eq!(overview.fault_count, 2);
        assert_eq!(overview.downtime_minutes, 42);
    }

    #[test]
    fn test_sort_by_status_then_line_id() {
        let now = local(2026, 3, 10, 10, 0);
        let mk = |line_id: &str, status: LineStatus| LineOverview {
            line_id: line_id.to_string(),
            throughput_rate: 0.0,
            oee: 0.0,
            status,
            downtime_minutes: 0,
            fault_count: 0,
            last_updated: now,
        };

        let sorted = overviews_sorted_by_status(vec![
            mk("LINE-03", LineStatus::Nominal),
            mk("LINE-02", LineStatus::Warning),
            mk("LINE-01", LineStatus::Critical),
        ]);

        let ids: Vec<_> = sorted.iter().map(|o| o.line_id.as_str()).collect();
        assert_eq!(ids, ["LINE-01", "LINE-02", "LINE-03"]);
    }

    #[test]
    fn test_sort_tie_break_is_line_id_ascending() {
        let now = local(2026, 3, 10, 10, 0);
        let mk = |line_id: &str, status: LineStatus| LineOverview {
            line_id: line_id.to_string(),
            throughput_rate: 0.0,
            oee: 0.0,
            status,
            downtime_minutes: 0,
            fault_count: 0,
            last_updated: now,
        };

        let sorted = overviews_sorted_by_status(vec![
            mk("LINE-09", LineStatus::Critical),
            mk("LINE-10", LineStatus::Nominal),
            mk("LINE-02", LineStatus::Critical),
            mk("LINE-04", LineStatus::Nominal),
        ]);

        let ids: Vec<_> = sorted.iter().map(|o| o.line_id.as_str()).collect();
        assert_eq!(ids, ["LINE-02", "LINE-09", "LINE-04", "LINE-10"]);
    }

    #[test]
    fn test_shift_summary_filters_to_half_open_window() {
        let reference = local(2026, 3, 10, 10, 0); // Shift A [06:00, 14:00)
        let store = store_with(
            "LINE-01",
            vec![
                reading(local(2026, 3, 10, 5, 45), 200.0), // before window
                reading(local(2026, 3, 10, 6, 0), 100.0),  // window start included
                reading(local(2026, 3, 10, 13, 45), 110.0),
                reading(local(2026, 3, 10, 14, 0), 200.0), // window end excluded
            ],
            vec![
                fault("LINE-01", local(2026, 3, 10, 7, 0), 15),
                fault("LINE-01", local(2026, 3, 10, 14, 0), 99), // next shift
            ],
        );

        let summary = shift_summary(&store, &calendar(), "LINE-01", reference);

        assert_eq!(summary.shift_name, ShiftName::A);
        assert_eq!(summary.shift_date, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        assert_eq!(summary.timezone, "Africa/Lagos");
        assert_eq!(summary.avg_throughput, 105.0);
        assert_eq!(summary.avg_oee, round1(105.0 / 1.15));
        assert_eq!(summary.fault_count, 1);
        assert_eq!(summary.downtime_minutes, 15);
    }

    #[test]
    fn test_shift_summary_empty_window_reports_oee_floor() {
        let reference = local(2026, 3, 10, 10, 0);
        let store = TelemetryStore::default();

        let summary = shift_summary(&store, &calendar(), "LINE-05", reference);

        assert_eq!(summary.avg_throughput, 0.0);
        // Quirk of the clamped proxy formula: an empty shift floors at 58.
        assert_eq!(summary.avg_oee, 58.0);
        assert_eq!(summary.fault_count, 0);
    }

    #[test]
    fn test_shift_summary_night_shift_dates_to_window_start() {
        // 02:00 local is Shift C anchored at the previous day's 22:00.
        let reference = local(2026, 3, 10, 2, 0);
        let store = TelemetryStore::default();

        let summary = shift_summary(&store, &calendar(), "LINE-01", reference);

        assert_eq!(summary.shift_name, ShiftName::C);
        assert_eq!(summary.shift_date, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
    }
}
