//! HTTP transport
//!
//! The pipeline talks to the identity service through the [`Transport`]
//! trait so tests can swap in a fake. [`HttpTransport`] is the reqwest-backed
//! implementation; it owns the connection pool and the request timeout.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client as ReqwestClient;
use tracing::debug;
use trusted_oauth_domain::{ClientError, Result, DEFAULT_TIMEOUT_SECS};
use url::Url;

use crate::errors::TransportFailure;
use crate::form::FormPayload;

/// Credentials attached to a single request
#[derive(Clone, PartialEq, Eq)]
pub enum Authorization {
    /// HTTP basic auth with the client id and secret
    Basic { username: String, password: String },
    /// `Authorization: Bearer <token>`
    Bearer(String),
}

impl Authorization {
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic { username: username.into(), password: password.into() }
    }

    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// Scheme name, safe to log
    #[must_use]
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::Bearer(_) => "bearer",
        }
    }
}

impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
        }
    }
}

/// A form-encoded POST waiting to be sent
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: Url,
    pub form: FormPayload,
    pub auth: Authorization,
}

/// Status and fully-read body of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one form-encoded POST and returns the complete response
///
/// Implementations must not retry and must return non-2xx responses as
/// `Ok`; classification happens further up.
#[async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    /// `ClientError::Transport` when no response was received.
    async fn post_form(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
}

impl HttpTransport {
    /// Start building a new transport.
    #[must_use]
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Transport with default configuration.
    ///
    /// # Errors
    /// `ClientError::Config` if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_form(&self, request: TransportRequest) -> Result<TransportResponse> {
        let TransportRequest { url, form, auth } = request;

        let builder = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/x-www-form-urlencoded"))
            .body(form.encode());
        let builder = match &auth {
            Authorization::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
            Authorization::Bearer(token) => builder.bearer_auth(token),
        };

        debug!(method = "POST", %url, auth = auth.scheme(), fields = form.len(), "sending HTTP request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                debug!(method = "POST", %url, error = %err, "HTTP request failed");
                return Err(TransportFailure::from(err).into());
            }
        };

        let status = response.status();
        debug!(method = "POST", %url, %status, "received HTTP response");

        let body = response.bytes().await.map_err(TransportFailure::from)?;

        Ok(TransportResponse { status: status.as_u16(), body: body.to_vec() })
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
    no_proxy: bool,
    accept_invalid_certs: bool,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
            default_headers: None,
            no_proxy: false,
            accept_invalid_certs: false,
        }
    }
}

impl HttpTransportBuilder {
    /// Total time allowed for one request, including reading the body.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    #[must_use]
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Ignore `HTTP_PROXY`/`HTTPS_PROXY` and connect directly. Off by
    /// default, so the system proxy settings apply.
    #[must_use]
    pub fn no_proxy(mut self, disabled: bool) -> Self {
        self.no_proxy = disabled;
        self
    }

    /// Test-only helper to allow insecure TLS (e.g., self-signed certs).
    #[cfg(test)]
    #[must_use]
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    /// # Errors
    /// `ClientError::Config` if reqwest rejects the configuration.
    pub fn build(self) -> Result<HttpTransport> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout);

        if self.no_proxy {
            builder = builder.no_proxy();
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|err| ClientError::Config(format!("cannot build HTTP client: {err}")))?;

        Ok(HttpTransport { client })
    }
}
