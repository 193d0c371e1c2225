//! Client credentials

use std::fmt;

use serde::{Deserialize, Serialize};

/// Credentials the client presents to the identity service
///
/// Immutable once the client is built. Used as HTTP basic auth on grant
/// requests (and on resource requests unless a bearer token is installed);
/// `scopes` are sent with every grant request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    /// Token endpoint, e.g. `https://id.example.com/oauth/token`
    pub token_url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl ClientCredentials {
    /// Create credentials
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_url: impl Into<String>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: token_url.into(),
            scopes,
        }
    }
}

// The secret never shows up in logs or panic messages.
impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_url", &self.token_url)
            .field("scopes", &self.scopes)
            .finish()
    }
}
