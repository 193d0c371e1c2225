//! Trusted client
//!
//! [`TrustedClient`] holds the client credentials, the derived endpoints and
//! the transport, and exposes every identity-service operation as an async
//! method. Grant flows always authenticate with the client credentials.
//!
//! Resource calls should carry a bearer token. [`TrustedClient::authorize`]
//! (or [`TrustedClient::connect`]) runs the client-credentials grant and
//! installs its access token; [`TrustedClient::with_bearer`] installs any
//! other token. Until one of those runs, resource calls fall back to basic
//! auth with the client credentials.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;
use trusted_oauth_domain::{
    ClientCredentials, OAuthUser, OAuthUserCreate, OAuthUserFilter, OAuthUserUpdate, Result,
    Token, TokenIntrospect,
};

use crate::caller::AuthenticatedCaller;
use crate::config::TrustedClientConfig;
use crate::endpoints::{Endpoints, SignupKind};
use crate::form::FormPayload;
use crate::grant::TokenFlows;
use crate::transport::{Authorization, HttpTransport, Transport};

/// `find-user` wraps the record in `{code, data}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FindUserEnvelope {
    data: Option<OAuthUser>,
}

/// Client for one trusted application
///
/// Cheap to clone; clones share the transport and its connection pool.
#[derive(Clone)]
pub struct TrustedClient {
    credentials: Arc<ClientCredentials>,
    endpoints: Arc<Endpoints>,
    caller: AuthenticatedCaller,
    flows: TokenFlows,
}

impl TrustedClient {
    /// Create a client over an existing transport
    ///
    /// # Errors
    /// Returns `ClientError::Config` if the token URL is unusable.
    pub fn new(credentials: ClientCredentials, transport: Arc<dyn Transport>) -> Result<Self> {
        let endpoints = Endpoints::from_token_url(&credentials.token_url)?;
        let caller = AuthenticatedCaller::new(
            transport,
            Authorization::basic(&credentials.client_id, &credentials.client_secret),
        );
        let flows = TokenFlows::new(&caller, &credentials, endpoints.token_url().clone());

        Ok(Self {
            credentials: Arc::new(credentials),
            endpoints: Arc::new(endpoints),
            caller,
            flows,
        })
    }

    /// Create a client with its own HTTP transport
    ///
    /// # Errors
    /// Returns `ClientError::Config` if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &TrustedClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder =
            HttpTransport::builder().timeout(config.timeout()).no_proxy(config.disable_proxy);
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent);
        }
        let transport = builder.build()?;

        tracing::debug!(client = %config.name, client_id = %config.client_id, "trusted client configured");

        Self::new(config.credentials(), Arc::new(transport))
    }

    /// Build a client from `config` and authorize it
    ///
    /// # Errors
    /// Configuration errors, and any failure of the client-credentials
    /// grant.
    pub async fn connect(config: &TrustedClientConfig) -> Result<Self> {
        Self::from_config(config)?.authorize().await
    }

    /// Copy of this client whose resource calls carry a fresh
    /// client-credentials access token
    ///
    /// The token is not refreshed; call this again once it expires.
    ///
    /// # Errors
    /// Transport, remote and decode failures of the client-credentials
    /// grant.
    #[instrument(skip_all, fields(client_id = %self.credentials.client_id))]
    pub async fn authorize(&self) -> Result<Self> {
        let token = self.flows.client_credentials().await?;
        tracing::debug!(expires_in = token.expires_in, "client authorized with bearer token");
        Ok(self.with_bearer(&token))
    }

    /// Copy of this client whose resource calls carry `token` as a bearer
    /// token. Grant flows keep using the client credentials.
    #[must_use]
    pub fn with_bearer(&self, token: &Token) -> Self {
        self.with_bearer_token(token.access_token.clone())
    }

    /// Same as [`with_bearer`](Self::with_bearer) with a raw access token
    #[must_use]
    pub fn with_bearer_token(&self, access_token: impl Into<String>) -> Self {
        Self {
            caller: self.caller.with_auth(Authorization::bearer(access_token)),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    // -- token flows --

    /// Exchange a username and password for a token
    ///
    /// # Errors
    /// Rejections carry the `wrong_username_password` code.
    #[instrument(skip_all, fields(grant = "password"))]
    pub async fn password_credentials_token(&self, username: &str, password: &str) -> Result<Token> {
        self.flows.password(username, password).await
    }

    /// Exchange a refresh token for a new token
    ///
    /// # Errors
    /// `ClientError::Remote` if the service rejects the refresh token.
    #[instrument(skip_all, fields(grant = "refresh_token"))]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Token> {
        self.flows.refresh(refresh_token).await
    }

    /// Obtain a token for the client itself
    ///
    /// # Errors
    /// `ClientError::Remote` if the service rejects the client.
    #[instrument(skip_all, fields(grant = "client_credentials"))]
    pub async fn client_credentials_token(&self) -> Result<Token> {
        self.flows.client_credentials().await
    }

    /// Revoking is not supported by the identity service; this always
    /// succeeds and sends nothing.
    ///
    /// # Errors
    /// Never.
    pub async fn revoke_token(&self, _token: &str) -> Result<()> {
        Ok(())
    }

    // -- resource operations --

    /// Look up what the service knows about a token
    ///
    /// # Errors
    /// Transport, remote and decode failures.
    #[instrument(skip_all)]
    pub async fn introspect(&self, token: &str) -> Result<TokenIntrospect> {
        let form = FormPayload::new().with("token", token);
        let body = self.caller.call(self.endpoints.introspect()?, form).await?;
        decode(&body)
    }

    /// Fetch a user by id
    ///
    /// # Errors
    /// Transport, remote and decode failures.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn find_user_by_id(&self, user_id: &str) -> Result<OAuthUser> {
        let body = self.caller.call(self.endpoints.user(user_id)?, FormPayload::new()).await?;
        decode(&body)
    }

    /// Find a user matching the set fields of `filter`
    ///
    /// # Errors
    /// Transport, remote and decode failures.
    #[instrument(skip_all)]
    pub async fn find_user(&self, filter: &OAuthUserFilter) -> Result<OAuthUser> {
        let form = FormPayload::from_fields(filter)?;
        let body = self.caller.call(self.endpoints.find_user()?, form).await?;
        let envelope: FindUserEnvelope = decode(&body)?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Register a user with username/password credentials
    ///
    /// # Errors
    /// Transport, remote and decode failures.
    #[instrument(skip_all, fields(signup = "password"))]
    pub async fn create_user(&self, user: &OAuthUserCreate) -> Result<Token> {
        let form = FormPayload::from_fields(user)?;
        let body = self.caller.call(self.endpoints.users()?, form).await?;
        decode(&body)
    }

    /// Register a user from a Google sign-in email
    ///
    /// # Errors
    /// Transport, remote and decode failures.
    #[instrument(skip_all, fields(signup = "gmail"))]
    pub async fn create_user_with_email(&self, email: &str) -> Result<Token> {
        let form = FormPayload::new().with("email", email);
        self.signup(SignupKind::Gmail, form).await
    }

    /// Register a user from a Facebook id
    ///
    /// # Errors
    /// Transport, remote and decode failures.
    #[instrument(skip_all, fields(signup = "facebook"))]
    pub async fn create_user_with_facebook(&self, fb_id: &str, email: &str) -> Result<Token> {
        let form = FormPayload::new().with("fb_id", fb_id).with("email", email);
        self.signup(SignupKind::Facebook, form).await
    }

    /// Register a user from an Account Kit login
    ///
    /// # Errors
    /// Transport, remote and decode failures.
    #[instrument(skip_all, fields(signup = "account-kit"))]
    pub async fn create_user_with_account_kit(
        &self,
        ak_id: &str,
        email: &str,
        phone_prefix: &str,
        phone: &str,
    ) -> Result<Token> {
        let form = FormPayload::new()
            .with("ak_id", ak_id)
            .with("email", email)
            .with("phone_prefix", phone_prefix)
            .with("phone", phone);
        self.signup(SignupKind::AccountKit, form).await
    }

    /// Apply the set fields of `update` to a user
    ///
    /// # Errors
    /// Transport and remote failures.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn update_user(&self, user_id: &str, update: &OAuthUserUpdate) -> Result<()> {
        let mut form = FormPayload::new().with("user_id", user_id);
        form.extend(FormPayload::from_fields(update)?);

        self.caller.call(self.endpoints.user_action(user_id, "update")?, form).await?;
        Ok(())
    }

    /// Change a user's password
    ///
    /// # Errors
    /// Transport and remote failures.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let form = FormPayload::new()
            .with("old_password", old_password)
            .with("new_password", new_password);

        self.caller.call(self.endpoints.user_action(user_id, "change-password")?, form).await?;
        Ok(())
    }

    /// Give an account created through a social login a username and
    /// password
    ///
    /// # Errors
    /// Transport and remote failures.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn set_username_password(
        &self,
        user_id: &str,
        username: &str,
        password: &str,
    ) -> Result<()> {
        let form = FormPayload::new().with("username", username).with("password", password);

        self.caller
            .call(self.endpoints.user_action(user_id, "set-username-password")?, form)
            .await?;
        Ok(())
    }

    /// Delete a user
    ///
    /// # Errors
    /// Transport and remote failures.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.caller.call(self.endpoints.user(user_id)?, FormPayload::new()).await?;
        Ok(())
    }

    async fn signup(&self, kind: SignupKind, form: FormPayload) -> Result<Token> {
        let body = self.caller.call(self.endpoints.signup(kind)?, form).await?;
        decode(&body)
    }
}

impl fmt::Debug for TrustedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustedClient")
            .field("credentials", &self.credentials)
            .field("auth", &self.caller.auth())
            .finish_non_exhaustive()
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(body)?)
}
