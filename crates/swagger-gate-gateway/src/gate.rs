//! Request gate middleware.
//!
//! Every request is classified from its session cookie before it reaches a
//! handler. Three modes are offered, each as an `axum` middleware function
//! to be installed with `middleware::from_fn_with_state`:
//!
//! - [`soft`]: never blocks, only records the [`AuthStatus`]
//! - [`enforce`]: redirects to `/login` unless the session is valid
//! - [`redirect_if_authenticated`]: the inverse, for the login page itself
//!
//! A session is valid when the cookie is present, the token verifies and
//! its subject is still on the allow-list. The allow-list is re-checked on
//! every request, so removing an address revokes its outstanding cookies.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};

use swagger_gate_auth::{AllowList, IdentityProvider, SessionToken, TokenCodec, SESSION_COOKIE_NAME};

use crate::cookies::removal_cookie;
use crate::state::GatewayState;

/// Result of inspecting a request's session cookie.
///
/// Inserted into request extensions by every gate mode.
#[derive(Debug, Clone, Default)]
pub struct AuthStatus {
    /// The verified claims, when the token itself verified.
    pub token: Option<SessionToken>,
    /// Whether the request carries a usable session.
    pub valid: bool,
}

impl AuthStatus {
    /// Status for a request without a usable session.
    #[must_use]
    pub const fn invalid() -> Self {
        Self {
            token: None,
            valid: false,
        }
    }

    /// The authenticated email, when valid.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        if self.valid {
            self.token.as_ref().map(SessionToken::subject)
        } else {
            None
        }
    }
}

/// Classify the session cookie in `jar` at time `now`.
#[must_use]
pub fn check_authorization(
    jar: &CookieJar,
    codec: &TokenCodec,
    policy: &AllowList,
    now: DateTime<Utc>,
) -> AuthStatus {
    let Some(cookie) = jar.get(SESSION_COOKIE_NAME) else {
        return AuthStatus::invalid();
    };

    let token = match codec.verify(cookie.value(), now) {
        Ok(token) => token,
        Err(e) => {
            tracing::debug!(error = %e, "Session cookie rejected");
            return AuthStatus::invalid();
        }
    };

    if !policy.is_permitted(token.subject()) {
        tracing::info!(email = %token.subject(), "Session subject no longer allowed");
        return AuthStatus {
            token: Some(token),
            valid: false,
        };
    }

    AuthStatus {
        token: Some(token),
        valid: true,
    }
}

/// A `302 Found` redirect to `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Record the session status and always proceed.
pub async fn soft<P>(
    State(state): State<Arc<GatewayState<P>>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response
where
    P: IdentityProvider + 'static,
{
    let status = check_authorization(&jar, &state.codec, &state.policy, Utc::now());
    request.extensions_mut().insert(status);
    next.run(request).await
}

/// Require a valid session when login is required.
///
/// Invalid sessions get their cookie cleared and a redirect to `/login`.
/// Responses that pass through are marked privately cacheable.
pub async fn enforce<P>(
    State(state): State<Arc<GatewayState<P>>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response
where
    P: IdentityProvider + 'static,
{
    let status = check_authorization(&jar, &state.codec, &state.policy, Utc::now());

    if state.config.should_login && !status.valid {
        tracing::debug!(path = %request.uri().path(), "Unauthenticated request redirected to login");
        return (jar.add(removal_cookie(&state.auth)), found("/login")).into_response();
    }

    request.extensions_mut().insert(status);
    let mut response = next.run(request).await;

    let cache_control = format!("private, max-age={}", state.config.cache_max_age_seconds);
    if let Ok(value) = HeaderValue::from_str(&cache_control) {
        response.headers_mut().insert(header::CACHE_CONTROL, value);
    }

    response
}

/// Send visitors who need no login page back to `/`.
///
/// Applies when login is not required at all, or the session is already valid.
pub async fn redirect_if_authenticated<P>(
    State(state): State<Arc<GatewayState<P>>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response
where
    P: IdentityProvider + 'static,
{
    let status = check_authorization(&jar, &state.codec, &state.policy, Utc::now());

    if !state.config.should_login || status.valid {
        return found("/");
    }

    request.extensions_mut().insert(status);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Cookie;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(b"gate-test-key", Duration::hours(1)).unwrap()
    }

    fn policy() -> AllowList {
        AllowList::new(Vec::<String>::new(), ["example.com"]).unwrap()
    }

    fn jar_with(token: &str) -> CookieJar {
        CookieJar::new().add(Cookie::new(SESSION_COOKIE_NAME, token.to_string()))
    }

    #[test]
    fn missing_cookie_is_invalid() {
        let status = check_authorization(&CookieJar::new(), &codec(), &policy(), now());
        assert!(!status.valid);
        assert!(status.token.is_none());
    }

    #[test]
    fn valid_cookie_is_valid() {
        let codec = codec();
        let token = codec.sign("alice@example.com", now()).unwrap();

        let status = check_authorization(&jar_with(&token), &codec, &policy(), now());

        assert!(status.valid);
        assert_eq!(status.email(), Some("alice@example.com"));
    }

    #[test]
    fn expired_cookie_is_invalid() {
        let codec = codec();
        let token = codec.sign("alice@example.com", now()).unwrap();

        let status = check_authorization(
            &jar_with(&token),
            &codec,
            &policy(),
            now() + Duration::hours(1),
        );
        assert!(!status.valid);
    }

    #[test]
    fn garbage_cookie_is_invalid() {
        let status = check_authorization(&jar_with("not-a-token"), &codec(), &policy(), now());
        assert!(!status.valid);
    }

    #[test]
    fn revoked_subject_is_invalid() {
        let codec = codec();
        let token = codec.sign("alice@example.com", now()).unwrap();
        let narrowed = AllowList::new(["bob@example.com"], Vec::<String>::new()).unwrap();

        let status = check_authorization(&jar_with(&token), &codec, &narrowed, now());

        assert!(!status.valid);
        assert!(status.token.is_some());
        assert_eq!(status.email(), None);
    }

    #[test]
    fn found_sets_location() {
        let response = found("/login");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }
}
