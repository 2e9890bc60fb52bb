//! API route handlers.
//!
//! Thin translation layer over the core engine: validate path/query/body
//! inputs, take the store lock, call the store or the aggregation engine,
//! and wrap the result in the response envelope. All domain decisions live
//! in the core modules, not here.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::OnceLock;

use axum::extract::{Path, Query, State};
use axum::response::Response;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::aggregate;
use crate::shifts::ShiftCalendar;
use crate::store::{FaultFilter, TelemetryError, TelemetryStore};
use crate::types::{FaultCategory, ThresholdConfig, TimeWindow};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers.
///
/// The store is the single mutable resource; the write lock taken by the
/// threshold update serializes it against every reader, so recomputation is
/// never observed half-done.
#[derive(Clone)]
pub struct DashboardState {
    pub store: Arc<RwLock<TelemetryStore>>,
    pub calendar: ShiftCalendar,
}

impl DashboardState {
    pub fn new(store: TelemetryStore, calendar: ShiftCalendar) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            calendar,
        }
    }
}

// ============================================================================
// Input Validation
// ============================================================================

static LINE_ID_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Line ids are `LINE-NN` with a two-digit number.
fn is_valid_line_id(line_id: &str) -> bool {
    LINE_ID_PATTERN
        .get_or_init(|| Regex::new(r"^LINE-\d{2}$").expect("static pattern compiles"))
        .is_match(line_id)
}

/// Parse a shift-summary reference: full RFC 3339, a naive local datetime,
/// or a bare date (midnight in the plant zone).
fn parse_reference_date(raw: &str, calendar: &ShiftCalendar) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })?;
    Some(DateTime::<Utc>::from_naive_utc_and_offset(
        naive - calendar.offset(),
        Utc,
    ))
}

// ============================================================================
// Health
// ============================================================================

/// GET /api/health — liveness probe, no envelope.
pub async fn get_health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}

// ============================================================================
// Overview
// ============================================================================

/// GET /api/lines/overview — all line overviews, critical lines first.
pub async fn get_overview(State(state): State<DashboardState>) -> Response {
    let now = Utc::now();
    let store = state.store.read().await;
    let sorted = aggregate::overviews_sorted_by_status(aggregate::all_overviews(
        &store,
        &state.calendar,
        now,
    ));

    let total = sorted.len();
    ApiResponse::with_meta(
        sorted,
        serde_json::json!({
            "total": total,
            "generatedAt": now,
        }),
    )
}

// ============================================================================
// Timeseries
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TimeseriesQuery {
    window: Option<String>,
}

/// GET /api/lines/{lineId}/timeseries?window=hour|shift|day|week
pub async fn get_timeseries(
    State(state): State<DashboardState>,
    Path(line_id): Path<String>,
    Query(query): Query<TimeseriesQuery>,
) -> Response {
    let window = match query.window.as_deref() {
        None => TimeWindow::Shift,
        Some(raw) => match TimeWindow::from_str(raw) {
            Ok(window) => window,
            Err(()) => {
                return ApiErrorResponse::bad_request("Invalid lineId or window query parameter.")
            }
        },
    };
    if !is_valid_line_id(&line_id) {
        return ApiErrorResponse::bad_request("Invalid lineId or window query parameter.");
    }

    let now = Utc::now();
    let since = state.calendar.resolve_window_start(window, now);
    let store = state.store.read().await;
    let points = store.series_since(&line_id, since).to_vec();

    ApiResponse::with_meta(
        points,
        serde_json::json!({
            "lineId": line_id,
            "window": window,
        }),
    )
}

// ============================================================================
// Faults
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FaultQuery {
    start: Option<String>,
    end: Option<String>,
    category: Option<String>,
}

/// GET /api/lines/{lineId}/faults?start&end&category
pub async fn get_faults(
    State(state): State<DashboardState>,
    Path(line_id): Path<String>,
    Query(query): Query<FaultQuery>,
) -> Response {
    const INVALID: &str = "Invalid filters provided for fault log query.";

    if !is_valid_line_id(&line_id) {
        return ApiErrorResponse::bad_request(INVALID);
    }

    let mut filter = FaultFilter::for_line(&line_id);
    for (raw, slot) in [(&query.start, &mut filter.start), (&query.end, &mut filter.end)] {
        if let Some(raw) = raw {
            match DateTime::parse_from_rfc3339(raw) {
                Ok(instant) => *slot = Some(instant.with_timezone(&Utc)),
                Err(_) => return ApiErrorResponse::bad_request(INVALID),
            }
        }
    }
    if let Some(raw) = &query.category {
        match FaultCategory::from_str(raw) {
            Ok(category) => filter.category = Some(category),
            Err(()) => return ApiErrorResponse::bad_request(INVALID),
        }
    }

    let store = state.store.read().await;
    let faults = store.faults_matching(&filter);

    let total = faults.len();
    ApiResponse::with_meta(faults, serde_json::json!({ "total": total }))
}

// ============================================================================
// Thresholds
// ============================================================================

/// GET /api/lines/{lineId}/thresholds
pub async fn get_thresholds(
    State(state): State<DashboardState>,
    Path(line_id): Path<String>,
) -> Response {
    if !is_valid_line_id(&line_id) {
        return ApiErrorResponse::bad_request("Invalid lineId format.");
    }

    let store = state.store.read().await;
    let thresholds = store.thresholds_for(&line_id);

    ApiResponse::ok(crate::types::LineThresholds {
        line_id,
        thresholds,
    })
}

#[derive(Debug, Deserialize)]
pub struct UpdateThresholdsRequest {
    thresholds: ThresholdConfig,
}

/// PUT /api/lines/{lineId}/thresholds
///
/// Replaces the config wholesale and reclassifies every stored reading for
/// the line before responding — the write lock makes the swap atomic for
/// all readers.
pub async fn update_thresholds(
    State(state): State<DashboardState>,
    Path(line_id): Path<String>,
    axum::Json(body): axum::Json<serde_json::Value>,
) -> Response {
    if !is_valid_line_id(&line_id) {
        return ApiErrorResponse::bad_request("Invalid payload for threshold update.");
    }
    let Ok(request) = serde_json::from_value::<UpdateThresholdsRequest>(body) else {
        return ApiErrorResponse::bad_request("Invalid payload for threshold update.");
    };

    let mut store = state.store.write().await;
    match store.update_thresholds(&line_id, request.thresholds) {
        Ok(updated) => {
            info!(line_id = %updated.line_id, "Thresholds updated, readings reclassified");
            ApiResponse::with_message(updated, "Thresholds updated")
        }
        Err(err @ TelemetryError::Validation(_)) => ApiErrorResponse::bad_request(err.to_string()),
    }
}

// ============================================================================
// Shift Summary
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ShiftSummaryQuery {
    date: Option<String>,
}

/// GET /api/lines/{lineId}/shifts/summary?date=
pub async fn get_shift_summary(
    State(state): State<DashboardState>,
    Path(line_id): Path<String>,
    Query(query): Query<ShiftSummaryQuery>,
) -> Response {
    if !is_valid_line_id(&line_id) {
        return ApiErrorResponse::bad_request("Invalid lineId or date.");
    }

    let reference = match &query.date {
        None => Utc::now(),
        Some(raw) => match parse_reference_date(raw, &state.calendar) {
            Some(instant) => instant,
            None => return ApiErrorResponse::bad_request("Invalid lineId or date."),
        },
    };

    let store = state.store.read().await;
    let summary = aggregate::shift_summary(&store, &state.calendar, &line_id, reference);

    ApiResponse::ok(summary)
}

// ============================================================================
// Export
// ============================================================================

/// GET /api/lines/export — faithful dump of the whole dataset.
pub async fn export_dataset(State(state): State<DashboardState>) -> Response {
    let store = state.store.read().await;
    ApiResponse::ok(store.export())
}
