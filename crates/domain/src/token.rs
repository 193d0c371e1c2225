//! Token types
//!
//! `Token` is what grant flows and user creation return; `TokenIntrospect` is
//! the snapshot returned by the introspection endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::serde_utils::opt_string_or_number;

/// Access and refresh tokens issued by the identity service
///
/// Expiry is not tracked: callers hold the token and call refresh before
/// `expires_in` elapses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Token {
    /// Bearer access token
    pub access_token: String,

    /// Refresh token, when the grant issued one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Token type (normally "Bearer")
    pub token_type: String,

    /// Whether the account behind the token has a username/password login
    pub has_username_password: bool,

    /// Whether the account was created by the call that produced the token
    pub is_new: bool,
}

/// Decoded token introspection result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenIntrospect {
    /// Whether the token is currently active
    pub active: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Expiry as a unix timestamp (seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issue time as a unix timestamp (seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,

    /// Any other fields the service reported
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenIntrospect {
    /// Expiry as a UTC timestamp
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Scopes as individual values (space separated on the wire)
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.as_deref().unwrap_or_default().split_whitespace()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for token types.
    use super::*;

    /// Validates that a full token body decodes every field.
    #[test]
    fn test_token_decodes_all_fields() {
        let json = r#"{
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "token_type": "Bearer",
            "has_username_password": true,
            "is_new": true
        }"#;

        let token: Token = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "at");
        assert_eq!(token.refresh_token.as_deref(), Some("rt"));
        assert_eq!(token.expires_in, 3600);
        assert!(token.has_username_password);
        assert!(token.is_new);
    }

    /// Validates that missing fields fall back to defaults instead of failing.
    #[test]
    fn test_token_missing_fields_default() {
        let token: Token = serde_json::from_str(r#"{"access_token":"only"}"#).unwrap();
        assert_eq!(token.access_token, "only");
        assert!(token.refresh_token.is_none());
        assert_eq!(token.expires_in, 0);
        assert!(!token.has_username_password);
        assert!(!token.is_new);
    }

    /// Validates introspection decoding, including numeric user ids and
    /// unknown fields.
    ///
    /// Assertions:
    /// - Confirms known fields are mapped.
    /// - Confirms `user_id` accepts a number.
    /// - Confirms unknown fields land in `extra`.
    /// - Confirms `expires_at` converts `exp`.
    #[test]
    fn test_introspect_decoding() {
        let json = r#"{
            "active": true,
            "scope": "profile email",
            "client_id": "web",
            "username": "alice",
            "exp": 1700000000,
            "user_id": 42,
            "tenant": "acme"
        }"#;

        let introspect: TokenIntrospect = serde_json::from_str(json).unwrap();
        assert!(introspect.active);
        assert_eq!(introspect.client_id.as_deref(), Some("web"));
        assert_eq!(introspect.username.as_deref(), Some("alice"));
        assert_eq!(introspect.user_id.as_deref(), Some("42"));
        assert_eq!(introspect.extra.get("tenant"), Some(&Value::from("acme")));
        assert_eq!(introspect.scopes().collect::<Vec<_>>(), vec!["profile", "email"]);
        assert_eq!(introspect.expires_at().map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn test_inactive_introspection() {
        let introspect: TokenIntrospect = serde_json::from_str(r#"{"active":false}"#).unwrap();
        assert!(!introspect.active);
        assert!(introspect.expires_at().is_none());
        assert_eq!(introspect.scopes().count(), 0);
    }
}
