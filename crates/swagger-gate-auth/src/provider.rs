//! Identity provider client.
//!
//! This module talks to the OAuth provider: it builds the authorization
//! redirect, exchanges an authorization code for an access token, and
//! resolves the access token to an email address.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use swagger_gate_core::EmailAddress;

use crate::error::{AuthError, ProviderError};
use crate::AuthConfig;

/// Scope requested from Google: the user's email address only.
pub const EMAIL_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.email";

/// An identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The account's email address.
    pub email: EmailAddress,
    /// Whether the provider has confirmed the address belongs to the account.
    pub verified_email: bool,
}

/// The provider side of the authorization-code flow.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Build the URL the browser is sent to, carrying `state` for CSRF protection.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// unusable response body.
    async fn exchange_code(&self, code: &str) -> Result<String, ProviderError>;

    /// Look up the identity behind an access token.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// response without an email address.
    async fn fetch_identity(&self, access_token: &str) -> Result<Identity, ProviderError>;
}

/// Form body for the token endpoint.
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    grant_type: &'static str,
    redirect_uri: &'a str,
}

/// Raw response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

/// Raw response from the user-info endpoint.
#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    #[serde(default)]
    email: String,
    #[serde(default)]
    verified_email: bool,
}

/// Google OAuth 2.0 client.
pub struct GoogleProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    authorize_endpoint: Url,
    token_endpoint: Url,
    userinfo_endpoint: Url,
}

impl GoogleProvider {
    /// Create a client from the auth configuration.
    ///
    /// Every provider call is bounded by `http_timeout_seconds`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if an endpoint URL does not parse or the
    /// HTTP client cannot be built.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .map_err(|e| AuthError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.callback_url(),
            authorize_endpoint: parse_endpoint("authorize_url", &config.authorize_url)?,
            token_endpoint: parse_endpoint("token_url", &config.token_url)?,
            userinfo_endpoint: parse_endpoint("userinfo_url", &config.userinfo_url)?,
        })
    }
}

fn parse_endpoint(name: &str, value: &str) -> Result<Url, AuthError> {
    Url::parse(value).map_err(|e| AuthError::Config(format!("invalid {name} {value:?}: {e}")))
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorization_url(&self, state: &str) -> String {
        let mut url = self.authorize_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("scope", EMAIL_SCOPE)
            .append_pair("response_type", "code")
            .append_pair("state", state)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("client_id", &self.client_id);
        url.into()
    }

    async fn exchange_code(&self, code: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(self.token_endpoint.clone())
            .form(&TokenRequest {
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                code,
                grant_type: "authorization_code",
                redirect_uri: &self.redirect_uri,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let token: TokenResponse = response.json().await?;
        if token.access_token.is_empty() {
            return Err(ProviderError::MissingField("access_token"));
        }

        Ok(token.access_token)
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<Identity, ProviderError> {
        let response = self
            .client
            .get(self.userinfo_endpoint.clone())
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let info: UserInfoResponse = response.json().await?;
        if info.email.is_empty() {
            return Err(ProviderError::MissingField("email"));
        }

        Ok(Identity {
            email: EmailAddress::new(info.email),
            verified_email: info.verified_email,
        })
    }
}

/// A scripted identity provider for tests.
///
/// Accepts exactly one authorization code and reports a fixed identity for
/// the access token it hands out.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockIdentityProvider {
    /// The only code `exchange_code` accepts.
    pub valid_code: String,
    /// Email reported by `fetch_identity`.
    pub email: String,
    /// Verification flag reported by `fetch_identity`.
    pub verified_email: bool,
    exchanges: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockIdentityProvider {
    /// Access token handed out for the valid code.
    pub const ACCESS_TOKEN: &'static str = "mock-access-token";

    /// A provider that accepts `valid_code` and reports a verified `email`.
    #[must_use]
    pub fn new(valid_code: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            valid_code: valid_code.into(),
            email: email.into(),
            verified_email: true,
            exchanges: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// How many times `exchange_code` has been called.
    #[must_use]
    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://provider.test/auth?state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<String, ProviderError> {
        self.exchanges
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if code == self.valid_code {
            Ok(Self::ACCESS_TOKEN.to_string())
        } else {
            Err(ProviderError::Status(400))
        }
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<Identity, ProviderError> {
        if access_token != Self::ACCESS_TOKEN {
            return Err(ProviderError::Status(401));
        }
        Ok(Identity {
            email: EmailAddress::new(self.email.clone()),
            verified_email: self.verified_email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> AuthConfig {
        AuthConfig {
            base_url: "https://docs.example.com".to_string(),
            client_id: "client-123".to_string(),
            client_secret: "secret-456".to_string(),
            signing_key: "key".to_string(),
            authorize_url: format!("{}/auth", server.uri()),
            token_url: format!("{}/token", server.uri()),
            userinfo_url: format!("{}/userinfo", server.uri()),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn authorization_url_carries_flow_parameters() {
        let provider = GoogleProvider::new(&AuthConfig {
            base_url: "https://docs.example.com".to_string(),
            client_id: "client-123".to_string(),
            ..AuthConfig::default()
        })
        .unwrap();

        let url = Url::parse(&provider.authorization_url("state-abc")).unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(url.path(), "/o/oauth2/v2/auth");

        let pairs: std::collections::HashMap<String, String> =
            url.query_pairs().into_owned().collect();
        assert_eq!(pairs["scope"], EMAIL_SCOPE);
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["state"], "state-abc");
        assert_eq!(pairs["redirect_uri"], "https://docs.example.com/callback");
        assert_eq!(pairs["client_id"], "client-123");
    }

    #[test]
    fn invalid_endpoint_is_config_error() {
        let result = GoogleProvider::new(&AuthConfig {
            token_url: "not a url".to_string(),
            ..AuthConfig::default()
        });
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[tokio::test]
    async fn exchange_code_posts_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=the-code"))
            .and(body_string_contains("client_id=client-123"))
            .and(body_string_contains("client_secret=secret-456"))
            .and(body_string_contains(
                "redirect_uri=https%3A%2F%2Fdocs.example.com%2Fcallback",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.token",
                "expires_in": 3599,
                "scope": EMAIL_SCOPE,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(&config_for(&server)).unwrap();
        let token = provider.exchange_code("the-code").await.unwrap();
        assert_eq!(token, "ya29.token");
    }

    #[tokio::test]
    async fn exchange_code_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(&config_for(&server)).unwrap();
        let err = provider.exchange_code("bad").await.unwrap_err();
        assert!(matches!(err, ProviderError::Status(400)));
    }

    #[tokio::test]
    async fn exchange_code_rejects_garbage_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(&config_for(&server)).unwrap();
        let err = provider.exchange_code("code").await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[tokio::test]
    async fn exchange_code_requires_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(&config_for(&server)).unwrap();
        let err = provider.exchange_code("code").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingField("access_token")));
    }

    #[tokio::test]
    async fn fetch_identity_uses_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer ya29.token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1234",
                "email": "alice@example.com",
                "verified_email": true,
                "picture": "https://example.com/a.png"
            })))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(&config_for(&server)).unwrap();
        let identity = provider.fetch_identity("ya29.token").await.unwrap();
        assert_eq!(identity.email.as_str(), "alice@example.com");
        assert!(identity.verified_email);
    }

    #[tokio::test]
    async fn fetch_identity_requires_email() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1234"})))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(&config_for(&server)).unwrap();
        let err = provider.fetch_identity("ya29.token").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingField("email")));
    }

    #[tokio::test]
    async fn fetch_identity_rejects_revoked_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(&config_for(&server)).unwrap();
        let err = provider.fetch_identity("expired").await.unwrap_err();
        assert!(matches!(err, ProviderError::Status(401)));
    }

    #[tokio::test]
    async fn unreachable_provider_is_transport_error() {
        let provider = GoogleProvider::new(&AuthConfig {
            token_url: "http://127.0.0.1:1/token".to_string(),
            http_timeout_seconds: 2,
            ..AuthConfig::default()
        })
        .unwrap();

        let err = provider.exchange_code("code").await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
