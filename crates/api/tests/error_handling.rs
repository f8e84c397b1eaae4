//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server or
//! database is needed.

use axum::response::IntoResponse;
use http_body_util::BodyExt;
use assetrack_api::error::AppError;
use assetrack_core::error::CoreError;
use assetrack_core::status::AssetStatus;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (axum::http::StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Asset",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Asset with id 42 not found");
}

#[tokio::test]
async fn not_found_by_key_returns_404() {
    let err = AppError::Core(CoreError::NotFoundByKey {
        entity: "Asset",
        key: "A-001".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Asset 'A-001' not found");
}

#[tokio::test]
async fn unavailable_asset_returns_409() {
    let err = AppError::Core(CoreError::AssetNotAvailable {
        asset_id: 3,
        status: AssetStatus::Allocated,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::CONFLICT);
    assert_eq!(json["code"], "ASSET_NOT_AVAILABLE");
    assert!(json["error"].as_str().unwrap().contains("ALLOCATED"));
}

#[tokio::test]
async fn duplicate_returns_409() {
    let err = AppError::Core(CoreError::Duplicate("Asset tag already exists".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::CONFLICT);
    assert_eq!(json["code"], "DUPLICATE");
    assert_eq!(json["error"], "Asset tag already exists");
}

#[tokio::test]
async fn invalid_operation_returns_422() {
    let err = AppError::Core(CoreError::InvalidOperation("User 9 is not active".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "INVALID_OPERATION");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("Asset name must not be empty".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Asset name must not be empty");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("invalid field value".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    for err in [
        AppError::Core(CoreError::Internal("connection reset".into())),
        AppError::InternalError("secret detail".into()),
        AppError::Database(sqlx::Error::PoolTimedOut),
    ] {
        let (status, json) = error_to_response(err).await;

        assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"], "An internal error occurred");
    }
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}
