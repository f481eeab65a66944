//! The OAuth authorization-code flow.
//!
//! A login moves through `Anonymous → RedirectIssued → Verified | Rejected`.
//! [`OAuthFlow::begin`] issues the redirect and records the correlation
//! identifier; [`OAuthFlow::complete`] handles the provider callback. The
//! correlation cache is the only state carried between the two.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use swagger_gate_core::{cache_key_for, CorrelationId, EmailAddress};

use crate::cache::CorrelationCache;
use crate::cookie::SessionCookie;
use crate::error::{AuthError, Result};
use crate::policy::AllowList;
use crate::provider::IdentityProvider;
use crate::token::TokenCodec;
use crate::AuthConfig;

/// Outcome of a successful callback.
#[derive(Debug, Clone)]
pub struct Verified {
    /// The authenticated, allow-listed email address.
    pub email: EmailAddress,
    /// The session cookie to hand to the browser.
    pub cookie: SessionCookie,
}

/// Orchestrates login against an identity provider.
pub struct OAuthFlow<P: IdentityProvider> {
    config: AuthConfig,
    provider: Arc<P>,
    cache: Arc<CorrelationCache>,
    codec: Arc<TokenCodec>,
    policy: Arc<AllowList>,
}

impl<P: IdentityProvider> OAuthFlow<P> {
    /// Create a flow from its collaborators.
    #[must_use]
    pub fn new(
        config: &AuthConfig,
        provider: Arc<P>,
        cache: Arc<CorrelationCache>,
        codec: Arc<TokenCodec>,
        policy: Arc<AllowList>,
    ) -> Self {
        Self {
            config: config.clone(),
            provider,
            cache,
            codec,
            policy,
        }
    }

    /// How long a pending login stays valid.
    #[must_use]
    pub const fn state_ttl(&self) -> Duration {
        self.config.state_ttl()
    }

    /// The correlation cache backing this flow.
    #[must_use]
    pub fn cache(&self) -> &CorrelationCache {
        &self.cache
    }

    /// Start a login: remember `correlation` and return the provider URL.
    #[must_use]
    pub fn begin(&self, correlation: CorrelationId) -> String {
        let state = correlation.to_string();
        self.cache
            .put(correlation.cache_key(), state.clone(), self.state_ttl());

        tracing::debug!(correlation = %correlation, "OAuth redirect issued");
        self.provider.authorization_url(&state)
    }

    /// Finish a login from the provider callback's `code` and `state`.
    ///
    /// # Errors
    ///
    /// - `AuthError::LoginFailed` when the state is unknown, reused or expired,
    ///   or when the code exchange or identity lookup fails
    /// - `AuthError::NotAllowed` when the identity is unverified or not on the
    ///   allow-list
    pub async fn complete(&self, code: &str, state: &str, now: DateTime<Utc>) -> Result<Verified> {
        if code.is_empty() || state.is_empty() {
            tracing::warn!("OAuth callback without code or state");
            return Err(AuthError::LoginFailed);
        }

        match self.cache.take(&cache_key_for(state)) {
            Some(stored) if stored == state => {}
            _ => {
                tracing::warn!("OAuth state unknown, reused or expired");
                return Err(AuthError::LoginFailed);
            }
        }

        let access_token = self.provider.exchange_code(code).await.map_err(|e| {
            tracing::warn!(error = %e, "OAuth code exchange failed");
            AuthError::LoginFailed
        })?;

        let identity = self
            .provider
            .fetch_identity(&access_token)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "OAuth identity lookup failed");
                AuthError::LoginFailed
            })?;

        if !identity.verified_email {
            tracing::warn!(email = %identity.email, "Login rejected: email not verified");
            return Err(AuthError::NotAllowed);
        }

        if !self.policy.is_permitted(identity.email.as_str()) {
            tracing::warn!(email = %identity.email, "Login rejected: not on allow-list");
            return Err(AuthError::NotAllowed);
        }

        let token = self.codec.sign(identity.email.as_str(), now).map_err(|e| {
            tracing::error!(error = %e, "Failed to mint session token");
            AuthError::LoginFailed
        })?;

        tracing::info!(email = %identity.email, "Login succeeded");

        Ok(Verified {
            cookie: SessionCookie::new(&self.config, token, self.codec.lifetime()),
            email: identity.email,
        })
    }
}
