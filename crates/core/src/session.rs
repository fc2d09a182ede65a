use secrecy::{ExposeSecret, SecretString};

/// Broker session credential pair attached to every authenticated call.
///
/// Opaque to the risk logic; both tokens are kept as secrets and never
/// printed.
pub struct Session {
    client_token: SecretString,
    security_token: SecretString,
}

impl Session {
    pub fn new(client_token: impl Into<String>, security_token: impl Into<String>) -> Self {
        Self {
            client_token: SecretString::from(client_token.into()),
            security_token: SecretString::from(security_token.into()),
        }
    }

    /// The `CST` header value.
    #[must_use]
    pub fn client_token(&self) -> &str {
        self.client_token.expose_secret()
    }

    /// The `X-SECURITY-TOKEN` header value.
    #[must_use]
    pub fn security_token(&self) -> &str {
        self.security_token.expose_secret()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("client_token", &"[REDACTED]")
            .field("security_token", &"[REDACTED]")
            .finish()
    }
}
