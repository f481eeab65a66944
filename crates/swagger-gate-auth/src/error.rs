//! Authentication error types.

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur during login and session verification.
///
/// The variants are deliberately coarse. Anything that goes wrong before the
/// allow-list is consulted is reported as `LoginFailed`, so a caller cannot
/// tell a forged `state` from a bad authorization code.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The OAuth flow failed (CSRF state, code exchange or identity lookup).
    #[error("google oauth login failed")]
    LoginFailed,

    /// The identity authenticated but is not on the allow-list.
    #[error("your account is not allowed to log in")]
    NotAllowed,

    /// The session token is missing, malformed, expired, forged or revoked.
    #[error("authorization has expired or invalid")]
    SessionInvalid,

    /// The configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns `true` if starting the login flow again may succeed.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::LoginFailed | Self::SessionInvalid)
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::LoginFailed | Self::SessionInvalid => 401,
            Self::NotAllowed => 403,
            Self::Config(_) | Self::Internal(_) => 500,
        }
    }
}

/// Failures talking to the identity provider.
///
/// These are logged and then collapsed into [`AuthError::LoginFailed`]; they
/// never reach an HTTP client.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {0}")]
    Status(u16),

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// A required field was absent or empty.
    #[error("missing field in provider response: {0}")]
    MissingField(&'static str),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
