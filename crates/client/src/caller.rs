//! Authenticated caller
//!
//! Sends a form to a derived endpoint with the client's credentials and runs
//! the response through a classifier.

use std::fmt;
use std::sync::Arc;

use trusted_oauth_domain::Result;
use url::Url;

use crate::form::FormPayload;
use crate::response::{ResourceResponse, ResponseClassifier};
use crate::transport::{Authorization, Transport, TransportRequest};

/// POSTs forms through a shared transport with fixed credentials
#[derive(Clone)]
pub struct AuthenticatedCaller {
    transport: Arc<dyn Transport>,
    auth: Authorization,
}

impl AuthenticatedCaller {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, auth: Authorization) -> Self {
        Self { transport, auth }
    }

    /// Same transport, different credentials
    #[must_use]
    pub fn with_auth(&self, auth: Authorization) -> Self {
        Self { transport: Arc::clone(&self.transport), auth }
    }

    #[must_use]
    pub fn auth(&self) -> &Authorization {
        &self.auth
    }

    /// Call a resource endpoint and return the raw success body
    ///
    /// # Errors
    /// Transport failures, `ClientError::Remote` for non-2xx responses with a
    /// resource error body, `ClientError::Decode` otherwise.
    pub async fn call(&self, url: Url, form: FormPayload) -> Result<Vec<u8>> {
        self.call_with(url, form, &ResourceResponse).await
    }

    /// Call an endpoint and classify the response with `classifier`
    ///
    /// # Errors
    /// Transport failures and whatever the classifier reports.
    pub async fn call_with<C>(&self, url: Url, form: FormPayload, classifier: &C) -> Result<C::Output>
    where
        C: ResponseClassifier + Sync,
    {
        let request = TransportRequest { url, form, auth: self.auth.clone() };
        let response = self.transport.post_form(request).await?;
        classifier.classify(response)
    }
}

impl fmt::Debug for AuthenticatedCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedCaller").field("auth", &self.auth).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use trusted_oauth_domain::ClientError;

    use super::*;
    use crate::response::GrantResponse;
    use crate::testing::MockTransport;

    fn url() -> Url {
        Url::parse("https://id.example.com/oauth/users/7").unwrap()
    }

    #[tokio::test]
    async fn forwards_form_url_and_credentials() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(200, r#"{"ok":true}"#);

        let caller = AuthenticatedCaller::new(transport.clone(), Authorization::basic("app", "pw"));
        let body = caller.call(url(), FormPayload::new().with("a", "1")).await.unwrap();

        assert_eq!(body, br#"{"ok":true}"#);
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, url());
        assert_eq!(requests[0].form.get("a"), Some("1"));
        assert_eq!(requests[0].auth, Authorization::basic("app", "pw"));
    }

    #[tokio::test]
    async fn with_auth_shares_the_transport() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(204, "");
        transport.push_response(204, "");

        let basic = AuthenticatedCaller::new(transport.clone(), Authorization::basic("app", "pw"));
        let bearer = basic.with_auth(Authorization::bearer("tok"));

        basic.call(url(), FormPayload::new()).await.unwrap();
        bearer.call(url(), FormPayload::new()).await.unwrap();

        let requests = transport.requests();
        assert_eq!(transport.call_count(), 2);
        assert_eq!(requests[1].auth, Authorization::bearer("tok"));
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let transport = Arc::new(MockTransport::new());
        transport.push_error(ClientError::Transport("connection reset".to_string()));

        let caller = AuthenticatedCaller::new(transport, Authorization::basic("app", "pw"));
        let err = caller.call(url(), FormPayload::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn classifier_is_chosen_by_the_call_site() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(401, r#"{"error":"invalid_grant"}"#);

        let caller = AuthenticatedCaller::new(transport, Authorization::basic("app", "pw"));
        let err = caller
            .call_with(url(), FormPayload::new(), &GrantResponse::password())
            .await
            .unwrap_err();
        assert!(err.is_wrong_credentials());
    }
}
