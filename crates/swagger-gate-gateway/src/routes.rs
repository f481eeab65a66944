//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::http::Uri;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use swagger_gate_auth::IdentityProvider;

use crate::error::ApiError;
use crate::gate;
use crate::handlers::{health, login, session};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET /callback` - OAuth callback
/// - `GET /logout` - Clear the session
///
/// ## Login page (redirects to `/` when no login is needed)
/// - `GET /login` - Start the OAuth flow
///
/// ## Protected (redirects to `/login` without a valid session)
/// - `GET /` - Landing page
///
/// ## Soft (never blocks)
/// - `GET /api/session` - Current session details
pub fn create_router<P>(state: GatewayState<P>) -> Router
where
    P: IdentityProvider + 'static,
{
    let request_timeout = state.config.request_timeout();
    let state = Arc::new(state);

    let login_page = Router::new()
        .route("/login", get(login::login::<P>))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            gate::redirect_if_authenticated::<P>,
        ));

    let protected = Router::new()
        .route("/", get(session::index))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            gate::enforce::<P>,
        ));

    let soft = Router::new()
        .route("/api/session", get(session::current_session))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            gate::soft::<P>,
        ));

    Router::new()
        .route("/health", get(health::health::<P>))
        .route("/callback", get(login::callback::<P>))
        .route("/logout", get(login::logout::<P>))
        .merge(login_page)
        .merge(protected)
        .merge(soft)
        .fallback(not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
