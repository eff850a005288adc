use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use salereg_core::error::CoreError;
use salereg_core::registration::RegistrationError;
use salereg_core::store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps domain errors from `salereg_core` and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `salereg_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed registration saga.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// A read-side sale store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Registration saga ---
            AppError::Registration(err) => classify_registration_error(err),

            // --- Store reads ---
            AppError::Store(err) => {
                tracing::error!(error = %err, "Sale store error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    INTERNAL_MESSAGE.to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
    }
}

/// Map a saga outcome to an HTTP status, error code, and message.
///
/// - Validation → 400, duplicate IMEI → 409.
/// - Lock actor unavailable → 503 (nothing happened, safe to retry).
/// - Store failures → 500, with compensation failures kept distinct.
fn classify_registration_error(err: &RegistrationError) -> (StatusCode, &'static str, String) {
    let code = err.code();
    match err {
        RegistrationError::Validation(core) => classify_core_error(core),
        RegistrationError::DuplicateIdentifier { imei } => (
            StatusCode::CONFLICT,
            code,
            format!("IMEI {imei} is already registered."),
        ),
        RegistrationError::CoordinationUnavailable(e) => {
            tracing::warn!(error = %e, "Registration refused, lock actor unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                code,
                "IMEI uniqueness could not be verified, try again later".to_string(),
            )
        }
        RegistrationError::StoreWriteFailed { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            code,
            "Failed to save sale data".to_string(),
        ),
        RegistrationError::CompensationFailed { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            code,
            "Failed to save sale data; the IMEI requires manual review".to_string(),
        ),
    }
}
