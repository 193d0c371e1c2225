//! Token flows
//!
//! Every grant posts to the token URL with the client's basic credentials
//! and one `scope` pair per configured scope.

use trusted_oauth_domain::{
    ClientCredentials, Result, Token, GRANT_TYPE_CLIENT_CREDENTIALS, GRANT_TYPE_PASSWORD,
    GRANT_TYPE_REFRESH_TOKEN,
};
use url::Url;

use crate::caller::AuthenticatedCaller;
use crate::form::FormPayload;
use crate::response::GrantResponse;
use crate::transport::Authorization;

/// Runs grant requests against the token endpoint
#[derive(Debug, Clone)]
pub struct TokenFlows {
    caller: AuthenticatedCaller,
    token_url: Url,
    scopes: Vec<String>,
}

impl TokenFlows {
    /// Flows for `credentials`, reusing the transport behind `caller`
    #[must_use]
    pub fn new(caller: &AuthenticatedCaller, credentials: &ClientCredentials, token_url: Url) -> Self {
        let auth = Authorization::basic(&credentials.client_id, &credentials.client_secret);
        Self { caller: caller.with_auth(auth), token_url, scopes: credentials.scopes.clone() }
    }

    /// Resource owner password grant
    ///
    /// # Errors
    /// Failures carry the `wrong_username_password` code.
    pub async fn password(&self, username: &str, password: &str) -> Result<Token> {
        let form = FormPayload::new()
            .with("grant_type", GRANT_TYPE_PASSWORD)
            .with("username", username)
            .with("password", password);

        let mut token = self.grant(form, GrantResponse::password()).await?;
        token.has_username_password = true;
        token.is_new = false;
        Ok(token)
    }

    /// Refresh grant. Token flags are passed through as decoded.
    ///
    /// # Errors
    /// Untagged `ClientError::Remote` on rejection.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token> {
        let form = FormPayload::new()
            .with("grant_type", GRANT_TYPE_REFRESH_TOKEN)
            .with("refresh_token", refresh_token);

        self.grant(form, GrantResponse::untagged()).await
    }

    /// Client credentials grant
    ///
    /// # Errors
    /// Untagged `ClientError::Remote` on rejection.
    pub async fn client_credentials(&self) -> Result<Token> {
        let form = FormPayload::new().with("grant_type", GRANT_TYPE_CLIENT_CREDENTIALS);
        self.grant(form, GrantResponse::untagged()).await
    }

    async fn grant(&self, form: FormPayload, classifier: GrantResponse) -> Result<Token> {
        let form = form.with_all("scope", self.scopes.iter().cloned());
        self.caller.call_with(self.token_url.clone(), form, &classifier).await
    }
}
