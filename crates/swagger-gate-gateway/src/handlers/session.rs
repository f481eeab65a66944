//! Protected landing page and session introspection.

use axum::response::{Html, IntoResponse};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::gate::AuthStatus;

/// Session details reported by `/api/session`.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    /// Whether the request carried a valid session.
    pub authenticated: bool,
    /// The signed-in email address.
    pub email: Option<String>,
    /// When the session expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&AuthStatus> for SessionInfo {
    fn from(status: &AuthStatus) -> Self {
        let token = status.token.as_ref().filter(|_| status.valid);
        Self {
            authenticated: status.valid,
            email: token.map(|t| t.subject().to_string()),
            expires_at: token.and_then(|t| t.expires_at()),
        }
    }
}

/// The protected landing page.
pub async fn index(Extension(status): Extension<AuthStatus>) -> impl IntoResponse {
    let greeting = match status.email() {
        Some(email) => format!(
            "<p>Signed in as <strong>{}</strong>. <a href=\"/logout\">Log out</a></p>",
            escape_html(email)
        ),
        None => String::new(),
    };

    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>API documentation</title></head>\n\
         <body>\n<h1>API documentation</h1>\n{greeting}\n</body>\n</html>\n"
    ))
}

/// Report the caller's session.
///
/// ```text
/// GET /api/session
///
/// Response: 200 OK
/// {
///   "authenticated": true,
///   "email": "alice@example.com",
///   "expires_at": "2026-03-02T09:00:00Z"
/// }
/// ```
pub async fn current_session(Extension(status): Extension<AuthStatus>) -> Json<SessionInfo> {
    Json(SessionInfo::from(&status))
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
