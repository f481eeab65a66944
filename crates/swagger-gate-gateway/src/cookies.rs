//! Session cookie rendering.
//!
//! The auth crate decides the cookie's value and scope; this module turns
//! that description into `axum_extra` cookies.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration as TimeDuration;

use swagger_gate_auth::{AuthConfig, SessionCookie, SESSION_COOKIE_NAME, SESSION_COOKIE_PATH};

/// Render the `Set-Cookie` for a freshly minted session.
#[must_use]
pub fn session_cookie(cookie: &SessionCookie) -> Cookie<'static> {
    let mut builder = Cookie::build((SESSION_COOKIE_NAME, cookie.value.clone()))
        .path(SESSION_COOKIE_PATH)
        .http_only(true)
        .secure(cookie.secure)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::seconds(cookie.max_age_seconds()));

    if let Some(domain) = &cookie.domain {
        builder = builder.domain(domain.clone());
    }

    builder.build()
}

/// An expired session cookie, used to clear the browser's copy.
///
/// Path and domain must match the cookie being cleared.
#[must_use]
pub fn removal_cookie(config: &AuthConfig) -> Cookie<'static> {
    let mut builder = Cookie::build((SESSION_COOKIE_NAME, ""))
        .path(SESSION_COOKIE_PATH)
        .http_only(true)
        .secure(config.secure_cookies())
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::ZERO);

    if let Some(domain) = config.cookie_domain() {
        builder = builder.domain(domain);
    }

    builder.build()
}
