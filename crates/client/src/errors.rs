//! Conversions from transport errors into client errors.

use reqwest::Error as HttpError;
use trusted_oauth_domain::ClientError;

/// Error newtype that keeps the reqwest conversion on the client side and can
/// be converted back into the domain error.
#[derive(Debug)]
pub struct TransportFailure(pub ClientError);

impl From<TransportFailure> for ClientError {
    fn from(value: TransportFailure) -> Self {
        value.0
    }
}

impl From<HttpError> for TransportFailure {
    fn from(err: HttpError) -> Self {
        if err.is_timeout() {
            return TransportFailure(ClientError::Transport("HTTP request timed out".into()));
        }

        #[cfg(not(target_arch = "wasm32"))]
        if err.is_connect() {
            return TransportFailure(ClientError::Transport(format!(
                "HTTP connection failure: {err}"
            )));
        }

        if err.is_builder() {
            return TransportFailure(ClientError::Config(format!("invalid HTTP request: {err}")));
        }

        if err.is_body() || err.is_decode() {
            return TransportFailure(ClientError::Transport(format!(
                "failed to read response body: {err}"
            )));
        }

        TransportFailure(ClientError::Transport(err.to_string()))
    }
}
