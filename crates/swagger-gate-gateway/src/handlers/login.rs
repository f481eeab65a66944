//! Login, OAuth callback and logout handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::Deserialize;

use swagger_gate_auth::IdentityProvider;
use swagger_gate_core::CorrelationId;

use crate::cookies::{removal_cookie, session_cookie};
use crate::error::ApiError;
use crate::gate::found;
use crate::state::GatewayState;

/// Query parameters of the provider callback.
///
/// Both are optional on the wire; a missing value fails the login like a
/// wrong one.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    /// Authorization code issued by the provider.
    #[serde(default)]
    pub code: String,
    /// Correlation identifier echoed back by the provider.
    #[serde(default)]
    pub state: String,
}

/// Start a login.
///
/// ```text
/// GET /login
///
/// Response: 302 Found
/// Location: https://accounts.google.com/o/oauth2/v2/auth?...&state=<correlation id>
/// ```
pub async fn login<P>(State(state): State<Arc<GatewayState<P>>>) -> Response
where
    P: IdentityProvider + 'static,
{
    let correlation = CorrelationId::generate();
    let location = state.flow.begin(correlation);
    found(&location)
}

/// Finish a login from the provider redirect.
///
/// On success the session cookie is set and the browser goes to `/`.
///
/// # Errors
///
/// `ApiError::LoginFailed` or `ApiError::NotAllowed`, both rendered as an
/// HTML page. No cookie is set.
pub async fn callback<P>(
    State(state): State<Arc<GatewayState<P>>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError>
where
    P: IdentityProvider + 'static,
{
    let verified = state
        .flow
        .complete(&params.code, &params.state, Utc::now())
        .await?;

    Ok((jar.add(session_cookie(&verified.cookie)), found("/")).into_response())
}

/// Clear the session cookie and return to the login page.
pub async fn logout<P>(State(state): State<Arc<GatewayState<P>>>, jar: CookieJar) -> Response
where
    P: IdentityProvider + 'static,
{
    tracing::debug!("Session cookie cleared");
    (jar.add(removal_cookie(&state.auth)), found("/login")).into_response()
}
