//! API route definitions.
//!
//! Endpoints for the factory-floor dashboard:
//! - /api/health - liveness probe
//! - /api/lines/overview - line status tiles, sorted by severity
//! - /api/lines/{lineId}/timeseries - windowed chart data
//! - /api/lines/{lineId}/faults - filtered fault log
//! - /api/lines/{lineId}/thresholds - read/replace threshold config
//! - /api/lines/{lineId}/shifts/summary - shift report
//! - /api/lines/export - full dataset snapshot

use axum::routing::get;
use axum::Router;

use super::handlers::{self, DashboardState};

/// Create all API routes for the dashboard.
pub fn api_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/lines/overview", get(handlers::get_overview))
        .route("/lines/export", get(handlers::export_dataset))
        .route("/lines/:line_id/timeseries", get(handlers::get_timeseries))
        .route("/lines/:line_id/faults", get(handlers::get_faults))
        .route(
            "/lines/:line_id/thresholds",
            get(handlers::get_thresholds).put(handlers::update_thresholds),
        )
        .route(
            "/lines/:line_id/shifts/summary",
            get(handlers::get_shift_summary),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shifts::ShiftCalendar;
    use crate::store::TelemetryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn create_test_state() -> DashboardState {
        DashboardState::new(TelemetryStore::default(), ShiftCalendar::default())
    }

    #[tokio::test]
    async fn test_api_routes_health() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_routes_overview() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/lines/overview")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_routes_timeseries() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/lines/LINE-01/timeseries?window=hour")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_routes_shift_summary() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/lines/LINE-01/shifts/summary")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
