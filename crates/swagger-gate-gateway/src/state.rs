//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use swagger_gate_auth::{
    AllowList, AuthConfig, AuthError, CorrelationCache, IdentityProvider, OAuthFlow, TokenCodec,
};

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
///
/// The token codec and allow-list are built once and shared read-only by the
/// login flow and the request gate.
pub struct GatewayState<P>
where
    P: IdentityProvider,
{
    /// The OAuth login flow.
    pub flow: Arc<OAuthFlow<P>>,
    /// Session token codec.
    pub codec: Arc<TokenCodec>,
    /// Who may use the service.
    pub policy: Arc<AllowList>,
    /// Auth settings derived from `config`, used for cookie scope.
    pub auth: AuthConfig,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<P> GatewayState<P>
where
    P: IdentityProvider,
{
    /// Create a new gateway state around `provider`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if the signing key, session lifetime or
    /// allow-list is unusable.
    pub fn new(config: GatewayConfig, provider: Arc<P>) -> Result<Self, AuthError> {
        let auth_config = config.auth_config();
        let codec = Arc::new(TokenCodec::from_config(&auth_config)?);
        let policy = Arc::new(config.allow_list()?);

        if config.should_login && policy.is_empty() {
            tracing::warn!("Allow-list is empty - nobody will be able to log in");
        }

        let flow = Arc::new(OAuthFlow::new(
            &auth_config,
            provider,
            Arc::new(CorrelationCache::new()),
            Arc::clone(&codec),
            Arc::clone(&policy),
        ));

        Ok(Self {
            flow,
            codec,
            policy,
            auth: auth_config,
            config,
        })
    }
}

impl<P> Clone for GatewayState<P>
where
    P: IdentityProvider,
{
    fn clone(&self) -> Self {
        Self {
            flow: Arc::clone(&self.flow),
            codec: Arc::clone(&self.codec),
            policy: Arc::clone(&self.policy),
            auth: self.auth.clone(),
            config: self.config.clone(),
        }
    }
}
