//! Session cookie description.
//!
//! The auth core decides what the session cookie looks like; the HTTP layer
//! only renders it. `Path=/`, `HttpOnly` and `SameSite=Lax` are fixed.

use std::fmt;

use chrono::Duration;

use crate::AuthConfig;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "swagger_gate_token";

/// Path attribute of the session cookie.
pub const SESSION_COOKIE_PATH: &str = "/";

/// The session cookie to set after a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie {
    /// The signed session token.
    pub value: String,
    /// `Domain` attribute: host of the configured base URL.
    pub domain: Option<String>,
    /// `Secure` attribute: set when the base URL is https.
    pub secure: bool,
    /// `Max-Age` attribute: the session token lifetime.
    pub max_age: Duration,
}

impl SessionCookie {
    /// Describe a session cookie holding `token` for the given configuration.
    #[must_use]
    pub fn new(config: &AuthConfig, token: String, max_age: Duration) -> Self {
        Self {
            value: token,
            domain: config.cookie_domain(),
            secure: config.secure_cookies(),
            max_age,
        }
    }

    /// `Max-Age` in whole seconds.
    #[must_use]
    pub fn max_age_seconds(&self) -> i64 {
        self.max_age.num_seconds()
    }
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &SESSION_COOKIE_NAME)
            .field("value", &"<redacted>")
            .field("domain", &self.domain)
            .field("secure", &self.secure)
            .field("max_age", &self.max_age)
            .finish()
    }
}
