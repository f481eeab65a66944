//! API error types and responses.
//!
//! Login failures are shown to a person in a browser, so they render as a
//! small HTML page. Everything else uses the JSON error body.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use swagger_gate_auth::AuthError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The login did not complete: failed, rejected, or the session is gone.
    #[error(transparent)]
    Login(AuthError),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Error details.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Login(err) => StatusCode::from_u16(err.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Login(AuthError::NotAllowed) => "not_allowed",
            Self::Login(_) => "login_failed",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            Self::Login(err) => {
                (status, Html(failure_page(&err.to_string(), err.is_retriable()))).into_response()
            }
            Self::NotFound(_) | Self::Internal(_) => {
                let message = if let Self::Internal(detail) = &self {
                    tracing::error!(error = %detail, "Request failed");
                    "internal error".to_string()
                } else {
                    self.to_string()
                };
                let body = ErrorResponse {
                    error: ErrorBody {
                        code: self.code(),
                        message,
                    },
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::LoginFailed | AuthError::NotAllowed | AuthError::SessionInvalid => {
                Self::Login(err)
            }
            AuthError::Config(_) | AuthError::Internal(_) => {
                tracing::error!(error = %err, "Auth internal error");
                Self::Internal("authentication service error".to_string())
            }
        }
    }
}

/// The page shown when a login does not complete.
///
/// Retriable failures offer a fresh login; a rejected account is offered a
/// sign-in with a different account instead.
fn failure_page(message: &str, retriable: bool) -> String {
    let next_step = if retriable {
        "<p><a href=\"/login\">Try again</a></p>"
    } else {
        "<p>Ask an administrator to grant access, or <a href=\"/login\">sign in with a different account</a>.</p>"
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Login failed</title></head>\n\
         <body>\n<h1>Login failed</h1>\n<p>{message}</p>\n{next_step}\n</body>\n</html>\n"
    )
}
