//! Response classification
//!
//! Resource endpoints and grant endpoints report failures in different
//! envelopes, so each has its own classifier. Call sites pick one explicitly.
//!
//! | Classifier | Success | Failure body |
//! |---|---|---|
//! | [`ResourceResponse`] | any 2xx, raw body | `{code, message, error_key, log}` |
//! | [`GrantResponse`] | exactly 200, `{token}` | `{error, error_description}` |

use serde::Deserialize;
use trusted_oauth_domain::{ClientError, RemoteError, Result, Token, WRONG_USERNAME_PASSWORD};

use crate::transport::TransportResponse;

/// Turns a raw response into a typed success or a classified error
pub trait ResponseClassifier {
    type Output;

    /// # Errors
    /// `ClientError::Remote` for a well-formed failure body,
    /// `ClientError::Decode` when the body does not match the envelope.
    fn classify(&self, response: TransportResponse) -> Result<Self::Output>;
}

/// Error body reported by resource endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResourceErrorBody {
    // `code` echoes the status and is ignored; the HTTP status wins
    message: Option<String>,
    #[serde(alias = "key")]
    error_key: Option<String>,
    log: Option<String>,
}

/// Classifier for user-management endpoints
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceResponse;

impl ResponseClassifier for ResourceResponse {
    type Output = Vec<u8>;

    fn classify(&self, response: TransportResponse) -> Result<Vec<u8>> {
        if response.is_success() {
            return Ok(response.body);
        }

        let body: ResourceErrorBody = serde_json::from_slice(&response.body).map_err(|e| {
            ClientError::Decode(format!(
                "cannot decode error body of HTTP {} response: {e}",
                response.status
            ))
        })?;

        let mut remote = RemoteError::new(response.status, body.message.unwrap_or_default());
        if let Some(key) = body.error_key.filter(|k| !k.is_empty()) {
            remote = remote.with_code(key);
        }
        if let Some(log) = body.log.filter(|l| !l.is_empty()) {
            remote = remote.with_detail(log);
        }

        Err(remote.into())
    }
}

/// Envelope returned by the token endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GrantBody {
    token: Option<Token>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Classifier for the token endpoint
///
/// `tag_wrong_credentials` marks failures with `wrong_username_password`;
/// only the password grant sets it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantResponse {
    pub tag_wrong_credentials: bool,
}

impl GrantResponse {
    #[must_use]
    pub fn password() -> Self {
        Self { tag_wrong_credentials: true }
    }

    #[must_use]
    pub fn untagged() -> Self {
        Self { tag_wrong_credentials: false }
    }
}

impl ResponseClassifier for GrantResponse {
    type Output = Token;

    fn classify(&self, response: TransportResponse) -> Result<Token> {
        // the envelope is decoded before the status is looked at
        let body: GrantBody = serde_json::from_slice(&response.body).map_err(|e| {
            ClientError::Decode(format!(
                "cannot decode token response (HTTP {}): {e}",
                response.status
            ))
        })?;

        if response.status == 200 {
            return body.token.ok_or_else(|| {
                ClientError::Decode("token response is missing the token object".to_string())
            });
        }

        let mut remote = RemoteError::new(response.status, body.error.unwrap_or_default());
        if self.tag_wrong_credentials {
            remote = remote.with_code(WRONG_USERNAME_PASSWORD);
        }
        if let Some(description) = body.error_description.filter(|d| !d.is_empty()) {
            remote = remote.with_detail(description);
        }

        Err(remote.into())
    }
}

#[cfg(test)]
mod tests {
    use trusted_oauth_domain::ClientErrorCategory;

    use super::*;

    fn response(status: u16, body: &str) -> TransportResponse {
        TransportResponse::new(status, body.as_bytes().to_vec())
    }

    #[test]
    fn resource_success_returns_raw_body() {
        let bytes = ResourceResponse.classify(response(200, r#"{"id":1}"#)).unwrap();
        assert_eq!(bytes, br#"{"id":1}"#);
    }

    #[test]
    fn resource_no_content_is_empty_success() {
        let bytes = ResourceResponse.classify(response(204, "")).unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn resource_not_found_maps_to_remote_error() {
        let err = ResourceResponse
            .classify(response(404, r#"{"code":404,"message":"not found"}"#))
            .unwrap_err();

        let remote = err.remote().unwrap();
        assert_eq!(remote.status, 404);
        assert_eq!(remote.message, "not found");
        assert_eq!(remote.code, None);
        assert_eq!(err.category(), ClientErrorCategory::NotFound);
    }

    #[test]
    fn resource_error_key_and_log_are_kept() {
        let err = ResourceResponse
            .classify(response(
                422,
                r#"{"code":"422","message":"invalid","error_key":"email_taken","log":"dup"}"#,
            ))
            .unwrap_err();

        let remote = err.remote().unwrap();
        assert_eq!(remote.code.as_deref(), Some("email_taken"));
        assert_eq!(remote.detail.as_deref(), Some("dup"));
        assert_eq!(err.category(), ClientErrorCategory::Rejected);
    }

    #[test]
    fn resource_non_json_error_is_decode_error() {
        let err = ResourceResponse.classify(response(502, "<html>bad gateway</html>")).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn resource_redirect_is_not_success() {
        let err = ResourceResponse.classify(response(302, "{}")).unwrap_err();
        assert_eq!(err.status(), Some(302));
    }

    #[test]
    fn grant_success_returns_token() {
        let token = GrantResponse::password()
            .classify(response(
                200,
                r#"{"token":{"access_token":"at","refresh_token":"rt","expires_in":60},"error":""}"#,
            ))
            .unwrap();

        assert_eq!(token.access_token, "at");
        assert_eq!(token.refresh_token.as_deref(), Some("rt"));
        assert_eq!(token.expires_in, 60);
    }

    #[test]
    fn grant_success_without_token_is_decode_error() {
        let err = GrantResponse::untagged().classify(response(200, r#"{"error":""}"#)).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn password_grant_failure_is_tagged() {
        let err = GrantResponse::password()
            .classify(response(401, r#"{"error":"invalid_grant"}"#))
            .unwrap_err();

        assert!(err.is_wrong_credentials());
        let remote = err.remote().unwrap();
        assert_eq!(remote.status, 401);
        assert_eq!(remote.message, "invalid_grant");
        assert_eq!(err.category(), ClientErrorCategory::Authentication);
    }

    #[test]
    fn untagged_grant_failure_keeps_description() {
        let err = GrantResponse::untagged()
            .classify(response(
                400,
                r#"{"error":"invalid_grant","error_description":"refresh token expired"}"#,
            ))
            .unwrap_err();

        assert!(!err.is_wrong_credentials());
        let remote = err.remote().unwrap();
        assert_eq!(remote.code, None);
        assert_eq!(remote.detail.as_deref(), Some("refresh token expired"));
    }

    #[test]
    fn grant_non_json_is_decode_error_regardless_of_status() {
        for status in [200, 401, 500] {
            let err = GrantResponse::password().classify(response(status, "nope")).unwrap_err();
            assert!(matches!(err, ClientError::Decode(_)), "status {status}");
        }
    }

    #[test]
    fn grant_only_accepts_exactly_200() {
        // 201 with a token is still a failure for the token endpoint
        let err = GrantResponse::untagged()
            .classify(response(201, r#"{"token":{"access_token":"at"}}"#))
            .unwrap_err();
        assert_eq!(err.status(), Some(201));
    }
}
