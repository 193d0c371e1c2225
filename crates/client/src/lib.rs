//! # Trusted OAuth Client
//!
//! Client for an OAuth2-style identity service, used by a trusted
//! application that holds its own client credentials.
//!
//! This crate contains:
//! - The HTTP transport and the `Transport` seam used to fake it
//! - Endpoint derivation from the configured token URL
//! - The authenticated caller and the two response classifiers
//! - Token flows (password, refresh, client credentials)
//! - User management operations on `TrustedClient`
//! - Configuration loading from the environment or JSON/TOML files
//!
//! ## Example
//! ```no_run
//! use trusted_oauth_client::{config, TrustedClient};
//!
//! # async fn run() -> trusted_oauth_domain::Result<()> {
//! let config = config::load("billing", None)?;
//! // resource calls carry a client-credentials bearer token
//! let client = TrustedClient::connect(&config).await?;
//! let user = client.find_user_by_id("42").await?;
//! # let _ = user;
//!
//! let token = client.password_credentials_token("alice", "hunter2").await?;
//! let user_client = client.with_bearer(&token);
//! let info = user_client.introspect(&token.access_token).await?;
//! # let _ = info;
//! # Ok(())
//! # }
//! ```

pub mod caller;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod errors;
pub mod form;
pub mod grant;
pub mod response;
pub mod traits;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used items
pub use caller::AuthenticatedCaller;
pub use client::TrustedClient;
pub use config::TrustedClientConfig;
pub use endpoints::{Endpoints, SignupKind};
pub use form::FormPayload;
pub use response::{GrantResponse, ResourceResponse, ResponseClassifier};
pub use traits::TrustedClientTrait;
pub use transport::{
    Authorization, HttpTransport, HttpTransportBuilder, Transport, TransportRequest,
    TransportResponse,
};
pub use trusted_oauth_domain::{ClientError, ClientErrorCategory, RemoteError, Result};
