//! Error types used throughout the client

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::WRONG_USERNAME_PASSWORD;

/// Structured error decoded from a non-success identity service response
///
/// Produced by both response decoders: resource endpoints report
/// `{code, message, error_key, log}` bodies, grant endpoints report
/// `{error, error_description}` bodies. Both end up here so callers branch on
/// one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    /// HTTP status of the response
    pub status: u16,

    /// Optional classification tag (e.g. `wrong_username_password`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Human readable message reported by the service
    pub message: String,

    /// Secondary text (`error_description` or `log`) when the service sent one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl RemoteError {
    /// Create a remote error without classification tag or detail
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self { status, code: None, message: message.into(), detail: None }
    }

    /// Attach a classification tag
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach secondary detail text
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// True when the password grant rejected the supplied credentials
    #[must_use]
    pub fn is_wrong_credentials(&self) -> bool {
        self.code.as_deref() == Some(WRONG_USERNAME_PASSWORD)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message)?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {}

/// Categories of client errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorCategory {
    /// Network/connection failures and timeouts
    Transport,
    /// Response body did not match the expected shape
    Decode,
    /// Remote rejected the credentials (401, 403, wrong username/password)
    Authentication,
    /// Remote resource does not exist (404)
    NotFound,
    /// Remote rejected the request (other 3xx/4xx)
    Rejected,
    /// Remote failed (5xx)
    Server,
    /// Invalid local configuration
    Config,
}

/// Client operation errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Get the error category for this error
    #[must_use]
    pub fn category(&self) -> ClientErrorCategory {
        match self {
            Self::Transport(_) => ClientErrorCategory::Transport,
            Self::Decode(_) => ClientErrorCategory::Decode,
            Self::Config(_) => ClientErrorCategory::Config,
            Self::Remote(remote) if remote.is_wrong_credentials() => {
                ClientErrorCategory::Authentication
            }
            Self::Remote(remote) => match remote.status {
                401 | 403 => ClientErrorCategory::Authentication,
                404 => ClientErrorCategory::NotFound,
                500..=599 => ClientErrorCategory::Server,
                _ => ClientErrorCategory::Rejected,
            },
        }
    }

    /// The remote error, if the service answered with one
    #[must_use]
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote(remote) => Some(remote),
            _ => None,
        }
    }

    /// HTTP status of the remote error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.remote().map(|remote| remote.status)
    }

    /// True when a password grant was rejected for bad credentials
    #[must_use]
    pub fn is_wrong_credentials(&self) -> bool {
        self.remote().is_some_and(RemoteError::is_wrong_credentials)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = RemoteError::new(404, "not found");
        assert_eq!(err.to_string(), "HTTP 404: not found");

        let err = RemoteError::new(401, "invalid_grant")
            .with_code(WRONG_USERNAME_PASSWORD)
            .with_detail("bad password");
        assert_eq!(err.to_string(), "HTTP 401: invalid_grant [wrong_username_password] (bad password)");
    }

    #[test]
    fn test_error_categories() {
        let category = |status| ClientError::from(RemoteError::new(status, "x")).category();

        assert_eq!(category(401), ClientErrorCategory::Authentication);
        assert_eq!(category(403), ClientErrorCategory::Authentication);
        assert_eq!(category(404), ClientErrorCategory::NotFound);
        assert_eq!(category(400), ClientErrorCategory::Rejected);
        assert_eq!(category(302), ClientErrorCategory::Rejected);
        assert_eq!(category(503), ClientErrorCategory::Server);
        assert_eq!(
            ClientError::Transport("refused".to_string()).category(),
            ClientErrorCategory::Transport
        );
        assert_eq!(ClientError::Decode("eof".to_string()).category(), ClientErrorCategory::Decode);
        assert_eq!(ClientError::Config("url".to_string()).category(), ClientErrorCategory::Config);
    }

    #[test]
    fn test_wrong_credentials_is_authentication_regardless_of_status() {
        let err: ClientError =
            RemoteError::new(400, "invalid_grant").with_code(WRONG_USERNAME_PASSWORD).into();

        assert!(err.is_wrong_credentials());
        assert_eq!(err.category(), ClientErrorCategory::Authentication);
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_non_remote_errors_have_no_status() {
        let err = ClientError::Transport("connection refused".to_string());
        assert!(err.remote().is_none());
        assert!(err.status().is_none());
        assert!(!err.is_wrong_credentials());
    }

    #[test]
    fn test_json_error_converts_to_decode() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ClientError = parse_err.into();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
