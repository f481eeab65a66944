//! Gateway configuration types.
//!
//! Configuration is read from environment variables at startup (a `.env`
//! file is honoured by the binary). Everything is immutable afterwards.

use std::time::Duration;

use thiserror::Error;

use swagger_gate_auth::{AllowList, AuthConfig, AuthError, MAX_SESSION_LIFETIME_SECONDS};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable is set but unusable.
    #[error("invalid {var}: {reason}")]
    Invalid {
        /// The offending variable.
        var: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Configuration for the gateway service.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:9080").
    pub listen_addr: String,

    /// Public base URL, used for the OAuth callback and cookie scope.
    pub base_url: String,

    /// Google OAuth client ID.
    pub google_client_id: String,

    /// Google OAuth client secret.
    pub google_client_secret: String,

    /// Session token signing key.
    pub jwt_key: String,

    /// Session lifetime in seconds.
    pub jwt_expired_time: i64,

    /// Email addresses allowed to log in.
    pub allowed_emails: Vec<String>,

    /// Email domains allowed to log in.
    pub allowed_domains: Vec<String>,

    /// Whether protected routes require login at all.
    pub should_login: bool,

    /// `Cache-Control` max-age for authenticated responses, in seconds.
    pub cache_max_age_seconds: u64,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:9080".to_string()
    }

    const fn default_jwt_expired_time() -> i64 {
        86_400 // 1 day
    }

    const fn default_should_login() -> bool {
        true
    }

    const fn default_cache_max_age() -> u64 {
        1800
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base_url = get("BASE_URL").ok_or(ConfigError::Missing("BASE_URL"))?;
        let should_login = match get("SHOULD_LOGIN") {
            Some(value) => parse_bool("SHOULD_LOGIN", &value)?,
            None => Self::default_should_login(),
        };

        let mut config = Self {
            listen_addr: get("LISTEN_ADDR").unwrap_or_else(Self::default_listen_addr),
            base_url,
            google_client_id: get("GOOGLE_CLIENT_ID").unwrap_or_default(),
            google_client_secret: get("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            jwt_key: get("JWT_KEY").unwrap_or_default(),
            jwt_expired_time: parse_or("JWT_EXPIRED_TIME", get("JWT_EXPIRED_TIME"), Self::default_jwt_expired_time())?,
            allowed_emails: split_list(get("ALLOWED_EMAILS")),
            allowed_domains: split_list(get("ALLOWED_DOMAINS")),
            should_login,
            cache_max_age_seconds: parse_or("CACHE_MAX_AGE", get("CACHE_MAX_AGE"), Self::default_cache_max_age())?,
            request_timeout_seconds: parse_or("REQUEST_TIMEOUT", get("REQUEST_TIMEOUT"), Self::default_request_timeout())?,
        };

        if !config.should_login && config.jwt_key.is_empty() {
            // Nothing is ever signed, but the codec still needs key material.
            config.jwt_key = uuid::Uuid::new_v4().simple().to_string();
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the gateway cannot run with.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "BASE_URL",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if !(1..=MAX_SESSION_LIFETIME_SECONDS).contains(&self.jwt_expired_time) {
            return Err(ConfigError::Invalid {
                var: "JWT_EXPIRED_TIME",
                reason: format!("must be between 1 and {MAX_SESSION_LIFETIME_SECONDS} seconds"),
            });
        }

        if self.should_login {
            if self.google_client_id.is_empty() {
                return Err(ConfigError::Missing("GOOGLE_CLIENT_ID"));
            }
            if self.google_client_secret.is_empty() {
                return Err(ConfigError::Missing("GOOGLE_CLIENT_SECRET"));
            }
            if self.jwt_key.is_empty() {
                return Err(ConfigError::Missing("JWT_KEY"));
            }
        }

        Ok(())
    }

    /// The auth configuration derived from this gateway configuration.
    #[must_use]
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            base_url: self.base_url.clone(),
            client_id: self.google_client_id.clone(),
            client_secret: self.google_client_secret.clone(),
            signing_key: self.jwt_key.clone(),
            session_lifetime_seconds: self.jwt_expired_time,
            ..AuthConfig::default()
        }
    }

    /// The allow-list derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if a domain entry is malformed.
    pub fn allow_list(&self) -> Result<AllowList, AuthError> {
        AllowList::new(&self.allowed_emails, &self.allowed_domains)
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("listen_addr", &self.listen_addr)
            .field("base_url", &self.base_url)
            .field("google_client_id", &self.google_client_id)
            .field("google_client_secret", &"<redacted>")
            .field("jwt_key", &"<redacted>")
            .field("jwt_expired_time", &self.jwt_expired_time)
            .field("allowed_emails", &self.allowed_emails)
            .field("allowed_domains", &self.allowed_domains)
            .field("should_login", &self.should_login)
            .field("cache_max_age_seconds", &self.cache_max_age_seconds)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            var,
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        GatewayConfig::from_lookup(|name| vars.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("BASE_URL", "https://docs.example.com"),
        ("GOOGLE_CLIENT_ID", "client"),
        ("GOOGLE_CLIENT_SECRET", "secret"),
        ("JWT_KEY", "key"),
    ];

    #[test]
    fn defaults_applied() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:9080");
        assert_eq!(config.jwt_expired_time, 86_400);
        assert!(config.should_login);
        assert_eq!(config.cache_max_age_seconds, 1800);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.allowed_emails.is_empty());
    }

    #[test]
    fn lists_are_split_and_trimmed() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("ALLOWED_EMAILS", "a@x.com, b@y.org ,"));
        vars.push(("ALLOWED_DOMAINS", "example.com"));
        let config = load(&vars).unwrap();

        assert_eq!(config.allowed_emails, vec!["a@x.com", "b@y.org"]);
        assert_eq!(config.allowed_domains, vec!["example.com"]);

        let allow = config.allow_list().unwrap();
        assert!(allow.is_permitted("b@y.org"));
        assert!(allow.is_permitted("c@example.com"));
    }

    #[test]
    fn base_url_required() {
        let result = load(&[("JWT_KEY", "key")]);
        assert!(matches!(result, Err(ConfigError::Missing("BASE_URL"))));
    }

    #[test]
    fn credentials_required_when_login_required() {
        let result = load(&[("BASE_URL", "https://docs.example.com")]);
        assert!(matches!(result, Err(ConfigError::Missing("GOOGLE_CLIENT_ID"))));
    }

    #[test]
    fn login_can_be_disabled() {
        let config = load(&[
            ("BASE_URL", "http://localhost:9080"),
            ("SHOULD_LOGIN", "false"),
        ])
        .unwrap();
        assert!(!config.should_login);
        assert!(!config.jwt_key.is_empty());
    }

    #[test]
    fn invalid_values_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("JWT_EXPIRED_TIME", "soon"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { var: "JWT_EXPIRED_TIME", .. })
        ));

        let mut vars = REQUIRED.to_vec();
        vars.push(("SHOULD_LOGIN", "maybe"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { var: "SHOULD_LOGIN", .. })
        ));

        let mut vars = REQUIRED.to_vec();
        vars[0] = ("BASE_URL", "docs.example.com");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { var: "BASE_URL", .. })
        ));
    }

    #[test]
    fn auth_config_carries_settings() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("JWT_EXPIRED_TIME", "600"));
        let auth = load(&vars).unwrap().auth_config();

        assert_eq!(auth.client_id, "client");
        assert_eq!(auth.signing_key, "key");
        assert_eq!(auth.session_lifetime_seconds, 600);
        assert_eq!(auth.callback_url(), "https://docs.example.com/callback");
    }

    #[test]
    fn session_lifetime_is_bounded() {
        for value in ["0", "-5", "9000000000000", "9223372036854775807"] {
            let mut vars = REQUIRED.to_vec();
            vars.push(("JWT_EXPIRED_TIME", value));
            assert!(
                matches!(
                    load(&vars),
                    Err(ConfigError::Invalid { var: "JWT_EXPIRED_TIME", .. })
                ),
                "accepted {value}"
            );
        }

        let mut vars = REQUIRED.to_vec();
        vars.push(("JWT_EXPIRED_TIME", "315360000"));
        assert_eq!(load(&vars).unwrap().jwt_expired_time, MAX_SESSION_LIFETIME_SECONDS);
    }

    #[test]
    fn debug_redacts_secrets() {
        let debug = format!("{:?}", load(&REQUIRED).unwrap());
        assert!(!debug.contains("\"secret\""));
        assert!(!debug.contains("\"key\""));
    }
}
