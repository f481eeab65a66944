//! Health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use swagger_gate_auth::IdentityProvider;

use crate::state::GatewayState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Whether protected pages require a Google login.
    pub login_required: bool,
    /// Number of allow-listed addresses and domains.
    pub allow_list_entries: usize,
    /// Logins started but not yet completed.
    pub pending_logins: usize,
}

impl HealthResponse {
    fn from_state<P: IdentityProvider>(state: &GatewayState<P>) -> Self {
        Self {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            login_required: state.config.should_login,
            allow_list_entries: state.policy.email_count() + state.policy.domain_count(),
            pending_logins: state.flow.cache().len(),
        }
    }
}

/// Health check handler.
///
/// Public: sits outside every gate so load balancers can reach it.
///
/// ```text
/// GET /health
///
/// Response: 200 OK
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "login_required": true,
///   "allow_list_entries": 2,
///   "pending_logins": 0
/// }
/// ```
pub async fn health<P>(State(state): State<Arc<GatewayState<P>>>) -> impl IntoResponse
where
    P: IdentityProvider + 'static,
{
    (StatusCode::OK, Json(HealthResponse::from_state(&state)))
}
