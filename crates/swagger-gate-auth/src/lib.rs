//! Google OAuth login and stateless sessions for swagger-gate.
//!
//! This crate provides the authentication core of the gateway:
//!
//! - A short-lived correlation cache binding each login redirect to its callback
//! - HS256 session tokens carrying the user's email and expiry
//! - An email/domain allow-list deciding who may use the service
//! - The OAuth authorization-code flow against Google
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  begin / complete  ┌──────────────────┐
//! │   Gateway        │───────────────────▶│   OAuthFlow      │
//! │   (HTTP)         │                    └──┬─────┬─────┬───┘
//! └────────┬─────────┘                       │     │     │
//!          │ every request          ┌────────▼┐ ┌──▼───┐ ┌▼────────────────┐
//!          ├───────────────────────▶│  Token  │ │Allow │ │ CorrelationCache│
//!          └───────────────────────▶│  Codec  │ │ List │ └─────────────────┘
//!                                   └─────────┘ └──────┘
//!                                                   ┌──────────────────┐
//!                          OAuthFlow ──────────────▶│ IdentityProvider │──▶ Google
//!                                                   └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use swagger_gate_auth::{
//!     AllowList, AuthConfig, CorrelationCache, GoogleProvider, OAuthFlow, TokenCodec,
//! };
//! use swagger_gate_core::CorrelationId;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig {
//!     base_url: "https://docs.example.com".to_string(),
//!     client_id: "client-id".to_string(),
//!     client_secret: "client-secret".to_string(),
//!     signing_key: "a-long-random-signing-key".to_string(),
//!     ..AuthConfig::default()
//! };
//!
//! let flow = OAuthFlow::new(
//!     &config,
//!     Arc::new(GoogleProvider::new(&config)?),
//!     Arc::new(CorrelationCache::new()),
//!     Arc::new(TokenCodec::from_config(&config)?),
//!     Arc::new(AllowList::new(Vec::<String>::new(), ["example.com"])?),
//! );
//!
//! let redirect_to = flow.begin(CorrelationId::generate());
//! println!("Send the browser to {redirect_to}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod cookie;
pub mod error;
pub mod flow;
pub mod policy;
pub mod provider;
pub mod token;

use std::fmt;

pub use cache::CorrelationCache;
pub use cookie::{SessionCookie, SESSION_COOKIE_NAME, SESSION_COOKIE_PATH};
pub use error::{AuthError, ProviderError, Result};
pub use flow::{OAuthFlow, Verified};
pub use policy::AllowList;
pub use provider::{GoogleProvider, Identity, IdentityProvider};
pub use token::{SessionToken, TokenCodec};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockIdentityProvider;

/// Google's OAuth 2.0 authorization endpoint.
pub const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Google's OAuth 2.0 token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Google's user-info endpoint.
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Longest session lifetime accepted: ten years.
pub const MAX_SESSION_LIFETIME_SECONDS: i64 = 10 * 365 * 86_400;

/// Path the provider redirects back to after login.
pub const CALLBACK_PATH: &str = "/callback";

/// Configuration for the login flow and session tokens.
#[derive(Clone)]
pub struct AuthConfig {
    /// Public base URL of the service (e.g., `https://docs.example.com`).
    pub base_url: String,
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Symmetric key used to sign session tokens.
    pub signing_key: String,
    /// Session token lifetime, in seconds.
    pub session_lifetime_seconds: i64,
    /// How long a login attempt may take between redirect and callback, in seconds.
    pub state_ttl_seconds: u64,
    /// Timeout for each call to the identity provider, in seconds.
    pub http_timeout_seconds: u64,
    /// Provider authorization endpoint.
    pub authorize_url: String,
    /// Provider token endpoint.
    pub token_url: String,
    /// Provider user-info endpoint.
    pub userinfo_url: String,
}

impl AuthConfig {
    /// The redirect URI registered with the provider.
    #[must_use]
    pub fn callback_url(&self) -> String {
        format!("{}{CALLBACK_PATH}", self.base_url.trim_end_matches('/'))
    }

    /// The cookie `Domain`: the host of the base URL, without port.
    #[must_use]
    pub fn cookie_domain(&self) -> Option<String> {
        reqwest::Url::parse(&self.base_url)
            .ok()?
            .host_str()
            .map(ToString::to_string)
    }

    /// Whether session cookies carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        reqwest::Url::parse(&self.base_url).is_ok_and(|url| url.scheme() == "https")
    }

    /// Session token lifetime as a duration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if the lifetime is not positive or exceeds
    /// [`MAX_SESSION_LIFETIME_SECONDS`].
    pub fn session_lifetime(&self) -> Result<chrono::Duration> {
        let seconds = self.session_lifetime_seconds;
        if !(1..=MAX_SESSION_LIFETIME_SECONDS).contains(&seconds) {
            return Err(AuthError::Config(format!(
                "session lifetime must be between 1 and {MAX_SESSION_LIFETIME_SECONDS} seconds, got {seconds}"
            )));
        }
        chrono::Duration::try_seconds(seconds)
            .ok_or_else(|| AuthError::Config(format!("session lifetime {seconds}s is out of range")))
    }

    /// Correlation entry lifetime as a duration.
    #[must_use]
    pub const fn state_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.state_ttl_seconds)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9080".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            signing_key: String::new(),
            session_lifetime_seconds: 86_400,
            state_ttl_seconds: 300,
            http_timeout_seconds: 10,
            authorize_url: GOOGLE_AUTHORIZE_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("signing_key", &"<redacted>")
            .field("session_lifetime_seconds", &self.session_lifetime_seconds)
            .field("state_ttl_seconds", &self.state_ttl_seconds)
            .field("http_timeout_seconds", &self.http_timeout_seconds)
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("userinfo_url", &self.userinfo_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.base_url, "http://localhost:9080");
        assert_eq!(config.session_lifetime_seconds, 86_400);
        assert_eq!(config.state_ttl_seconds, 300);
        assert_eq!(config.authorize_url, GOOGLE_AUTHORIZE_URL);
        assert_eq!(config.token_url, GOOGLE_TOKEN_URL);
        assert_eq!(config.userinfo_url, GOOGLE_USERINFO_URL);
    }

    #[test]
    fn callback_url_ignores_trailing_slash() {
        let config = AuthConfig {
            base_url: "https://docs.example.com/".to_string(),
            ..AuthConfig::default()
        };
        assert_eq!(config.callback_url(), "https://docs.example.com/callback");
    }

    #[test]
    fn cookie_attributes_follow_base_url() {
        let https = AuthConfig {
            base_url: "https://docs.example.com:8443".to_string(),
            ..AuthConfig::default()
        };
        assert_eq!(https.cookie_domain().as_deref(), Some("docs.example.com"));
        assert!(https.secure_cookies());

        let http = AuthConfig::default();
        assert_eq!(http.cookie_domain().as_deref(), Some("localhost"));
        assert!(!http.secure_cookies());
    }

    #[test]
    fn session_lifetime_bounds() {
        let lifetime = |seconds| AuthConfig {
            session_lifetime_seconds: seconds,
            ..AuthConfig::default()
        };

        assert_eq!(
            lifetime(3600).session_lifetime().unwrap(),
            chrono::Duration::hours(1)
        );
        assert!(lifetime(MAX_SESSION_LIFETIME_SECONDS).session_lifetime().is_ok());
        assert!(matches!(
            lifetime(MAX_SESSION_LIFETIME_SECONDS + 1).session_lifetime(),
            Err(AuthError::Config(_))
        ));
        assert!(matches!(
            lifetime(i64::MAX).session_lifetime(),
            Err(AuthError::Config(_))
        ));
        assert!(matches!(
            lifetime(0).session_lifetime(),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = AuthConfig {
            client_secret: "very-secret".to_string(),
            signing_key: "signing-key".to_string(),
            ..AuthConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("signing-key"));
    }

    #[test]
    fn auth_error_status_codes() {
        assert_eq!(AuthError::LoginFailed.http_status_code(), 401);
        assert_eq!(AuthError::SessionInvalid.http_status_code(), 401);
        assert_eq!(AuthError::NotAllowed.http_status_code(), 403);
        assert_eq!(AuthError::Config("x".into()).http_status_code(), 500);
    }

    #[test]
    fn auth_error_retriable() {
        assert!(AuthError::LoginFailed.is_retriable());
        assert!(AuthError::SessionInvalid.is_retriable());
        assert!(!AuthError::NotAllowed.is_retriable());
        assert!(!AuthError::Internal("x".into()).is_retriable());
    }
}
