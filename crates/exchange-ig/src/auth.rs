//! Credentials for IG session login.
//!
//! IG issues a session as two response headers (`CST` and `X-SECURITY-TOKEN`)
//! in exchange for an API key plus account identifier and password.
//!
//! # Security
//!
//! - Credentials are loaded from environment variables
//! - The password is held as a [`SecretString`] and never logged
//! - Key material is zeroized on drop

use crate::error::{IgError, Result};
use position_guard_core::BrokerConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use zeroize::Zeroize;

// =============================================================================
// Configuration
// =============================================================================

/// Names of the environment variables holding IG credentials.
#[derive(Debug, Clone)]
pub struct IgAuthConfig {
    pub api_key_env: String,
    pub username_env: String,
    pub password_env: String,
}

impl Default for IgAuthConfig {
    fn default() -> Self {
        Self {
            api_key_env: "IG_API_KEY".to_string(),
            username_env: "IG_USERNAME".to_string(),
            password_env: "IG_PASSWORD".to_string(),
        }
    }
}

impl From<&BrokerConfig> for IgAuthConfig {
    fn from(broker: &BrokerConfig) -> Self {
        Self {
            api_key_env: broker.api_key_env.clone(),
            username_env: broker.username_env.clone(),
            password_env: broker.password_env.clone(),
        }
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// Body of `POST /session`.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

/// IG API key and account login.
pub struct IgCredentials {
    api_key: String,
    identifier: String,
    password: SecretString,
}

impl std::fmt::Debug for IgCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IgCredentials")
            .field("api_key", &"[REDACTED]")
            .field("identifier", &self.identifier)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Drop for IgCredentials {
    fn drop(&mut self) {
        self.api_key.zeroize();
        self.identifier.zeroize();
    }
}

impl IgCredentials {
    pub fn new(
        api_key: impl Into<String>,
        identifier: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            identifier: identifier.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Reads credentials from the environment variables named in `config`.
    ///
    /// # Errors
    /// Returns [`IgError::Configuration`] naming the first missing variable.
    pub fn from_env(config: &IgAuthConfig) -> Result<Self> {
        let read = |name: &str| {
            std::env::var(name).map_err(|_| {
                IgError::Configuration(format!("missing environment variable: {name}"))
            })
        };

        let api_key = read(&config.api_key_env)?;
        let identifier = read(&config.username_env)?;
        let password = read(&config.password_env)?;

        Ok(Self::new(api_key, identifier, password))
    }

    /// Value of the `X-IG-API-KEY` header.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub(crate) fn login_request(&self) -> LoginRequest<'_> {
        LoginRequest {
            identifier: &self.identifier,
            password: self.password.expose_secret(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_default() {
        let config = IgAuthConfig::default();
        assert_eq!(config.api_key_env, "IG_API_KEY");
        assert_eq!(config.username_env, "IG_USERNAME");
        assert_eq!(config.password_env, "IG_PASSWORD");
    }

    #[test]
    fn test_auth_config_from_broker_config() {
        let broker = BrokerConfig {
            api_key_env: "DEMO_KEY".to_string(),
            ..BrokerConfig::default()
        };
        let config = IgAuthConfig::from(&broker);
        assert_eq!(config.api_key_env, "DEMO_KEY");
        assert_eq!(config.password_env, "IG_PASSWORD");
    }

    #[test]
    fn test_from_env_missing_variable() {
        let config = IgAuthConfig {
            api_key_env: "POSITION_GUARD_TEST_MISSING_KEY".to_string(),
            username_env: "POSITION_GUARD_TEST_MISSING_USER".to_string(),
            password_env: "POSITION_GUARD_TEST_MISSING_PASS".to_string(),
        };

        let err = IgCredentials::from_env(&config).unwrap_err();
        assert!(matches!(err, IgError::Configuration(_)));
        assert!(err.to_string().contains("POSITION_GUARD_TEST_MISSING_KEY"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = IgCredentials::new("api-key-123", "trader1", "hunter2");
        let debug_output = format!("{creds:?}");
        assert!(!debug_output.contains("api-key-123"));
        assert!(!debug_output.contains("hunter2"));
        assert!(debug_output.contains("trader1"));
    }

    #[test]
    fn test_login_request_body() {
        let creds = IgCredentials::new("key", "trader1", "hunter2");
        let body = serde_json::to_value(creds.login_request()).unwrap();
        assert_eq!(body["identifier"], "trader1");
        assert_eq!(body["password"], "hunter2");
    }
}
