//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses.
//!
//! The reader-facing API never expresses a *decision* through an error:
//! denials are ordinary `ok:false` bodies built by the services. Errors
//! here cover the cases where no decision could be made at all (broken
//! storage, a failed randomness source) and the admin gate's two exits
//! (login redirect, access denied).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

/// Application-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute, which
    /// automatically implements `From<sqlx::Error> for AppError`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The OS randomness source failed while generating a secret.
    ///
    /// Treated like a storage failure: the request dies, the process
    /// lives, and no weak or zeroed secret is ever handed out.
    #[error("Secret generation failed: {0}")]
    Random(String),

    /// No valid admin session; the browser is sent to the login page.
    #[error("Login required")]
    SessionRequired,

    /// The session is valid but lacks the adminTab privilege.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Access denied")]
    AccessDenied,
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
///
/// Internal failures are reported with an opaque JSON envelope; clients
/// never see stack traces or driver error text.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::SessionRequired => Redirect::to("/admin/login").into_response(),

            AppError::AccessDenied => {
                (StatusCode::FORBIDDEN, "Access Denied").into_response()
            }

            AppError::Database(ref e) => {
                tracing::error!("database error: {e}");
                internal_error_response()
            }

            AppError::Random(ref e) => {
                tracing::error!("randomness source failure: {e}");
                internal_error_response()
            }
        }
    }
}

/// Opaque 500 body shared by all internal failures.
fn internal_error_response() -> Response {
    let body = Json(json!({
        "error": {
            "code": "internal_error",
            "message": "An internal error occurred"
        }
    }));

    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}
