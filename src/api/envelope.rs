//! Consistent response envelope for all API endpoints.
//!
//! Every success is `{ "data": T, "meta"?: {...}, "message"?: "..." }` and
//! every error is `{ "message": "..." }` with an appropriate status code,
//! ensuring a uniform JSON shape across the dashboard API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Successful response: `{ "data": T, "meta"?: ..., "message"?: ... }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Response {
        let body = Self {
            data,
            meta: None,
            message: None,
        };
        (StatusCode::OK, axum::Json(body)).into_response()
    }

    pub fn with_meta(data: T, meta: serde_json::Value) -> Response {
        let body = Self {
            data,
            meta: Some(meta),
            message: None,
        };
        (StatusCode::OK, axum::Json(body)).into_response()
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Response {
        let body = Self {
            data,
            meta: None,
            message: Some(message.into()),
        };
        (StatusCode::OK, axum::Json(body)).into_response()
    }
}

/// Error response: `{ "message": "..." }`
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub message: String,
}

impl ApiErrorResponse {
    fn build(status: StatusCode, msg: impl Into<String>) -> Response {
        let body = Self {
            message: msg.into(),
        };
        (status, axum::Json(body)).into_response()
    }

    pub fn bad_request(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ok_response_shape() {
        let resp = ApiResponse::ok(serde_json::json!({"hello": "world"}));
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(v.get("data").is_some());
        assert!(v.get("meta").is_none());
        assert!(v.get("message").is_none());
    }

    #[tokio::test]
    async fn test_meta_and_message_included_when_set() {
        let resp = ApiResponse::with_meta(1, serde_json::json!({"total": 1}));
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["meta"]["total"], 1);

        let resp = ApiResponse::with_message(1, "Thresholds updated");
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["message"], "Thresholds updated");
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let resp = ApiErrorResponse::bad_request("Invalid lineId format.");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["message"], "Invalid lineId format.");
    }
}
