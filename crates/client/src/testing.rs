//! Test doubles
//!
//! [`MockTransport`] replaces the HTTP transport with scripted responses and
//! records every request it receives.
//!
//! ```
//! use std::sync::Arc;
//!
//! use trusted_oauth_client::testing::MockTransport;
//!
//! let transport = Arc::new(MockTransport::new());
//! transport.push_response(200, r#"{"token":{"access_token":"at"}}"#);
//! assert_eq!(transport.call_count(), 0);
//! ```

// Test doubles keep their panics simple
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use trusted_oauth_domain::{ClientError, Result};

use crate::transport::{Transport, TransportRequest, TransportResponse};

type Script = Arc<Mutex<VecDeque<Result<TransportResponse>>>>;
type RequestLog = Arc<Mutex<Vec<TransportRequest>>>;

/// Transport that replays queued responses in order
///
/// With an empty queue it answers `200 {}` so operations that ignore the
/// body still succeed.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    script: Script,
    requests: RequestLog,
}

impl MockTransport {
    /// Create a transport with nothing queued
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response
    pub fn push_response(&self, status: u16, body: &str) {
        // SAFETY: Mutex poisoning is acceptable in test mocks - if a test panics,
        // the entire test fails anyway
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(TransportResponse::new(status, body.as_bytes().to_vec())));
    }

    /// Queue a failure, as if no response arrived
    pub fn push_error(&self, error: ClientError) {
        // SAFETY: Mutex poisoning is acceptable in test mocks
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Every request received so far
    #[must_use]
    pub fn requests(&self) -> Vec<TransportRequest> {
        // SAFETY: Mutex poisoning is acceptable in test mocks
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request
    #[must_use]
    pub fn last_request(&self) -> Option<TransportRequest> {
        // SAFETY: Mutex poisoning is acceptable in test mocks
        self.requests.lock().unwrap().last().cloned()
    }

    /// Number of requests received
    #[must_use]
    pub fn call_count(&self) -> usize {
        // SAFETY: Mutex poisoning is acceptable in test mocks
        self.requests.lock().unwrap().len()
    }

    /// Forget recorded requests and queued responses
    pub fn reset(&self) {
        // SAFETY: Mutex poisoning is acceptable in test mocks
        self.requests.lock().unwrap().clear();
        self.script.lock().unwrap().clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_form(&self, request: TransportRequest) -> Result<TransportResponse> {
        // SAFETY: Mutex poisoning is acceptable in test mocks
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(TransportResponse::new(200, b"{}".to_vec())))
    }
}
