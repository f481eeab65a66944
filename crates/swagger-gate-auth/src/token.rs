//! Session token signing and verification.
//!
//! A session token is an HS256 JWS whose claims carry the user's email, the
//! issue time and the expiry. Nothing is stored server-side: a token is valid
//! exactly when its signature checks out and its expiry lies in the future.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};
use crate::{AuthConfig, MAX_SESSION_LIFETIME_SECONDS};

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Subject: the authenticated email address.
    pub sub: String,
    /// Expiration, unix seconds.
    pub exp: i64,
    /// Issued at, unix seconds.
    pub iat: i64,
}

impl SessionToken {
    /// The authenticated email address.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// When the token was issued.
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// When the token stops being valid.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Expiry is strict: a token whose `exp` equals `now` is already expired.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

/// Signs and verifies session tokens with a single symmetric key.
///
/// Keys are derived once at construction; share the codec behind an `Arc`.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenCodec {
    /// Create a codec from raw key material and a token lifetime.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if the key is empty, or the lifetime is not
    /// positive or longer than [`MAX_SESSION_LIFETIME_SECONDS`].
    pub fn new(signing_key: &[u8], lifetime: Duration) -> Result<Self> {
        if signing_key.is_empty() {
            return Err(AuthError::Config("session signing key is empty".to_string()));
        }
        if lifetime <= Duration::zero() {
            return Err(AuthError::Config(
                "session lifetime must be positive".to_string(),
            ));
        }
        if lifetime.num_seconds() > MAX_SESSION_LIFETIME_SECONDS {
            return Err(AuthError::Config(format!(
                "session lifetime must not exceed {MAX_SESSION_LIFETIME_SECONDS} seconds"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock in `verify`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(signing_key),
            decoding: DecodingKey::from_secret(signing_key),
            validation,
            lifetime,
        })
    }

    /// Create a codec from the auth configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if the key is empty or the lifetime is out of range.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Self::new(config.signing_key.as_bytes(), config.session_lifetime()?)
    }

    /// How long a freshly signed token stays valid.
    #[must_use]
    pub const fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Sign a token for `subject`, issued at `now`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the expiry falls outside the
    /// representable time range or the claims cannot be encoded.
    pub fn sign(&self, subject: &str, now: DateTime<Utc>) -> Result<String> {
        let expires_at = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AuthError::Internal("session expiry out of range".to_string()))?;

        let claims = SessionToken {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("failed to sign session token: {e}")))
    }

    /// Verify `token` at `now` and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionInvalid` for malformed, forged or expired
    /// tokens, without saying which.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionToken> {
        let data = decode::<SessionToken>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            AuthError::SessionInvalid
        })?;

        let claims = data.claims;
        if claims.is_expired_at(now) {
            tracing::debug!(exp = claims.exp, "Session token expired");
            return Err(AuthError::SessionInvalid);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
