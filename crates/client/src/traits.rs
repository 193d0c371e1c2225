//! Trait for trusted client operations
//!
//! Lets hosting applications depend on `Arc<dyn TrustedClientTrait>` and
//! swap in their own implementation under test.

use async_trait::async_trait;
use trusted_oauth_domain::{
    OAuthUser, OAuthUserCreate, OAuthUserFilter, OAuthUserUpdate, Result, Token, TokenIntrospect,
};

use crate::client::TrustedClient;

/// Identity-service operations available to a trusted application
#[async_trait]
pub trait TrustedClientTrait: Send + Sync {
    /// Exchange a username and password for a token
    ///
    /// # Errors
    /// Rejections carry the `wrong_username_password` code.
    async fn password_credentials_token(&self, username: &str, password: &str) -> Result<Token>;

    /// Exchange a refresh token for a new token
    async fn refresh_token(&self, refresh_token: &str) -> Result<Token>;

    /// Obtain a token for the client itself
    async fn client_credentials_token(&self) -> Result<Token>;

    /// Inspect a token
    async fn introspect(&self, token: &str) -> Result<TokenIntrospect>;

    /// Fetch a user by id
    async fn find_user_by_id(&self, user_id: &str) -> Result<OAuthUser>;

    /// Find a user by the set fields of `filter`
    async fn find_user(&self, filter: &OAuthUserFilter) -> Result<OAuthUser>;

    /// Register a user with username/password credentials
    async fn create_user(&self, user: &OAuthUserCreate) -> Result<Token>;

    /// Register a user from a Google sign-in email
    async fn create_user_with_email(&self, email: &str) -> Result<Token>;

    /// Register a user from a Facebook id
    async fn create_user_with_facebook(&self, fb_id: &str, email: &str) -> Result<Token>;

    /// Register a user from an Account Kit login
    async fn create_user_with_account_kit(
        &self,
        ak_id: &str,
        email: &str,
        phone_prefix: &str,
        phone: &str,
    ) -> Result<Token>;

    /// Partially update a user
    async fn update_user(&self, user_id: &str, update: &OAuthUserUpdate) -> Result<()>;

    /// Change a user's password
    async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<()>;

    /// Set username/password login on an existing account
    async fn set_username_password(
        &self,
        user_id: &str,
        username: &str,
        password: &str,
    ) -> Result<()>;

    /// Delete a user
    async fn delete_user(&self, user_id: &str) -> Result<()>;

    /// Revoke a token (always succeeds without a network call)
    async fn revoke_token(&self, token: &str) -> Result<()>;
}

#[async_trait]
impl TrustedClientTrait for TrustedClient {
    async fn password_credentials_token(&self, username: &str, password: &str) -> Result<Token> {
        TrustedClient::password_credentials_token(self, username, password).await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<Token> {
        TrustedClient::refresh_token(self, refresh_token).await
    }

    async fn client_credentials_token(&self) -> Result<Token> {
        TrustedClient::client_credentials_token(self).await
    }

    async fn introspect(&self, token: &str) -> Result<TokenIntrospect> {
        TrustedClient::introspect(self, token).await
    }

    async fn find_user_by_id(&self, user_id: &str) -> Result<OAuthUser> {
        TrustedClient::find_user_by_id(self, user_id).await
    }

    async fn find_user(&self, filter: &OAuthUserFilter) -> Result<OAuthUser> {
        TrustedClient::find_user(self, filter).await
    }

    async fn create_user(&self, user: &OAuthUserCreate) -> Result<Token> {
        TrustedClient::create_user(self, user).await
    }

    async fn create_user_with_email(&self, email: &str) -> Result<Token> {
        TrustedClient::create_user_with_email(self, email).await
    }

    async fn create_user_with_facebook(&self, fb_id: &str, email: &str) -> Result<Token> {
        TrustedClient::create_user_with_facebook(self, fb_id, email).await
    }

    async fn create_user_with_account_kit(
        &self,
        ak_id: &str,
        email: &str,
        phone_prefix: &str,
        phone: &str,
    ) -> Result<Token> {
        TrustedClient::create_user_with_account_kit(self, ak_id, email, phone_prefix, phone).await
    }

    async fn update_user(&self, user_id: &str, update: &OAuthUserUpdate) -> Result<()> {
        TrustedClient::update_user(self, user_id, update).await
    }

    async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        TrustedClient::change_password(self, user_id, old_password, new_password).await
    }

    async fn set_username_password(
        &self,
        user_id: &str,
        username: &str,
        password: &str,
    ) -> Result<()> {
        TrustedClient::set_username_password(self, user_id, username, password).await
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        TrustedClient::delete_user(self, user_id).await
    }

    async fn revoke_token(&self, token: &str) -> Result<()> {
        TrustedClient::revoke_token(self, token).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use trusted_oauth_domain::ClientCredentials;

    use super::*;
    use crate::testing::MockTransport;

    #[tokio::test]
    async fn client_is_usable_as_trait_object() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(200, r#"{"id":"7","username":"bob"}"#);

        let credentials =
            ClientCredentials::new("app", "secret", "https://id.example.com/oauth/token", vec![]);
        let client: Arc<dyn TrustedClientTrait> =
            Arc::new(TrustedClient::new(credentials, transport.clone()).unwrap());

        let user = client.find_user_by_id("7").await.unwrap();
        assert_eq!(user.username.as_deref(), Some("bob"));

        client.revoke_token("anything").await.unwrap();
        assert_eq!(transport.call_count(), 1);
    }
}
