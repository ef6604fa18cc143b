//! Tests for `AppError` → HTTP response mapping.
//!
//! Most call `IntoResponse` directly on `AppError` values; the panic and
//! timeout cases go through the same layers `build_app_router` installs.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Router};
use http_body_util::BodyExt;
use todo_api::error::{panic_response, timeout_response, AppError};
use todo_core::error::CoreError;
use todo_core::store::StoreError;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    response_json(err.into_response()).await
}

async fn response_json(response: Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_errors_return_404() {
    for err in [
        CoreError::CategoryNotFound { id: 42 },
        CoreError::CategoryNameNotFound { name: "x".into() },
        CoreError::TaskNotFound { id: 42 },
    ] {
        let (status, json) = error_to_response(AppError::Core(err)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], 404);
    }
}

#[tokio::test]
async fn payload_has_timestamp_code_and_message_list() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::CategoryNotFound { id: 42 })).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["timestamp"].is_string());
    assert_eq!(json["code"], 404);
    assert_eq!(
        json["message"],
        serde_json::json!(["Cannot find category with id : 42"])
    );
}

#[tokio::test]
async fn conflicts_return_409() {
    for err in [
        CoreError::CategoryAlreadyExists { name: "a".into() },
        CoreError::CategoryHasAssociatedTasks { id: 1 },
        CoreError::TaskAlreadyExists { id: 1 },
    ] {
        let (status, _) = error_to_response(AppError::Core(err)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}

#[tokio::test]
async fn validation_returns_400_with_every_message() {
    let err = AppError::Core(CoreError::Validation(vec![
        "Task name cannot be blank".into(),
        "Task deadline cannot be null".into(),
    ]));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], 400);
    assert_eq!(
        json["message"],
        serde_json::json!(["Task name cannot be blank", "Task deadline cannot be null"])
    );
}

#[tokio::test]
async fn bad_request_returns_400() {
    let (status, json) = error_to_response(AppError::BadRequest("invalid body".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], serde_json::json!(["invalid body"]));
}

#[tokio::test]
async fn unclassified_constraint_violation_returns_409() {
    let err = AppError::Core(CoreError::Store(StoreError::UniqueViolation {
        constraint: "uq_other".into(),
    }));
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        json["message"],
        serde_json::json!(["Request violates constraint: uq_other"])
    );
}

#[tokio::test]
async fn internal_errors_return_500_and_sanitize_message() {
    for err in [
        AppError::InternalError("secret database credentials leaked".into()),
        AppError::Core(CoreError::Internal("secret".into())),
        AppError::Core(CoreError::Store(StoreError::Backend(
            "connection refused to 10.0.0.3".into(),
        ))),
    ] {
        let (status, json) = error_to_response(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], 500);
        assert_eq!(
            json["message"],
            serde_json::json!(["An internal error occurred"])
        );
    }
}

// ---------------------------------------------------------------------------
// Middleware-produced failures
// ---------------------------------------------------------------------------

async fn panicking_handler() -> &'static str {
    panic!("kaboom: secret detail")
}

async fn slow_handler() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "late"
}

async fn call(app: Router, uri: &str) -> Response {
    use tower::ServiceExt;

    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn panicking_handler_returns_structured_500() {
    let app = Router::new()
        .route("/boom", get(panicking_handler))
        .layer(CatchPanicLayer::custom(panic_response));

    let response = call(app, "/boom").await;
    assert_eq!(
        response.headers()["content-type"],
        "application/json"
    );
    let (status, json) = response_json(response).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], 500);
    assert_eq!(
        json["message"],
        serde_json::json!(["An internal error occurred"])
    );
    assert!(json["timestamp"].is_string());
}

fn timeout_app() -> Router {
    Router::new()
        .route("/slow", get(slow_handler))
        .route("/fast", get(|| async { "ok" }))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_millis(20),
        ))
        .layer(middleware::map_response(timeout_response))
}

#[tokio::test]
async fn timed_out_request_returns_structured_408() {
    let (status, json) = response_json(call(timeout_app(), "/slow").await).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(json["code"], 408);
    assert_eq!(json["message"], serde_json::json!(["Request timed out"]));
}

#[tokio::test]
async fn responses_within_timeout_pass_through() {
    let response = call(timeout_app(), "/fast").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}
