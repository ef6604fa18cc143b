use std::any::Any;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use todo_core::error::CoreError;
use todo_core::store::StoreError;
use todo_core::types::Timestamp;

/// Message returned in place of any internal failure detail.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

const TIMEOUT_MESSAGE: &str = "Request timed out";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `todo_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A malformed request body or path with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),

    /// The request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Structured error payload: `{timestamp, code, message: [..]}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub timestamp: Timestamp,
    pub code: u16,
    pub message: Vec<String>,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Core(core) => classify_core_error(core),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, vec![msg]),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, vec![INTERNAL_MESSAGE.to_string()])
            }
            AppError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                vec![TIMEOUT_MESSAGE.to_string()],
            ),
        };

        let body = ErrorBody {
            timestamp: chrono::Utc::now(),
            code: status.as_u16(),
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Panic handler for `CatchPanicLayer`: logs the payload and answers with
/// the sanitized 500 body.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "non-string panic payload".to_string()
    };
    AppError::InternalError(format!("handler panicked: {detail}")).into_response()
}

/// Replace the empty 408 emitted by the timeout layer with an [`ErrorBody`].
pub async fn timeout_response(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        AppError::Timeout.into_response()
    } else {
        response
    }
}

/// Map a domain error to an HTTP status and its messages.
///
/// - Missing entities map to 404.
/// - Name clashes and deletes blocked by references map to 409.
/// - Validation failures map to 400 with one message per field.
/// - Storage and internal faults map to 500 with a sanitized message.
fn classify_core_error(err: CoreError) -> (StatusCode, Vec<String>) {
    let status = match &err {
        CoreError::CategoryNotFound { .. }
        | CoreError::CategoryNameNotFound { .. }
        | CoreError::TaskNotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::CategoryAlreadyExists { .. }
        | CoreError::CategoryHasAssociatedTasks { .. }
        | CoreError::TaskAlreadyExists { .. } => StatusCode::CONFLICT,
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Store(StoreError::UniqueViolation { constraint })
        | CoreError::Store(StoreError::ForeignKeyViolation { constraint }) => {
            tracing::warn!(%constraint, "Unclassified constraint violation");
            return (
                StatusCode::CONFLICT,
                vec![format!("Request violates constraint: {constraint}")],
            );
        }
        CoreError::Store(StoreError::Backend(_)) | CoreError::Internal(_) => {
            tracing::error!(error = %err, "Internal core error");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                vec![INTERNAL_MESSAGE.to_string()],
            );
        }
    };
    (status, err.messages())
}
