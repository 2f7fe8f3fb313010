//! Transport layer for GraphQL requests

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

use crate::error::{BitqueryError, Result};

/// Header carrying the caller's API key
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Transport trait for GraphQL communication (object-safe)
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON body and return the raw response body.
    ///
    /// The HTTP status is not interpreted; whatever the server sent back is
    /// returned unaltered.
    async fn post(&self, endpoint: &Url, api_key: &str, body: Vec<u8>) -> Result<Bytes>;
}

/// A request captured by [`MockTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// Target URL
    pub endpoint: String,
    /// API key sent with the request
    pub api_key: String,
    /// JSON body
    pub body: Vec<u8>,
}

/// Mock transport for testing
///
/// Clones share the same responses and request log.
#[derive(Clone)]
pub struct MockTransport {
    responses: Arc<Mutex<HashMap<String, Bytes>>>,
    default_response: Arc<Mutex<Bytes>>,
    failure: Arc<Mutex<Option<String>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    /// Create a new mock transport answering `{"data": null}` to everything
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(Bytes::from_static(br#"{"data":null}"#))),
            failure: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the response body for one endpoint
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (only possible if another thread panicked while holding the lock).
    pub fn set_response(&self, endpoint: &str, body: impl Into<Bytes>) {
        self.responses
            .lock()
            .expect("MockTransport mutex poisoned")
            .insert(normalize(endpoint), body.into());
    }

    /// Set the response body for endpoints without a specific response
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn set_default_response(&self, body: impl Into<Bytes>) {
        *self
            .default_response
            .lock()
            .expect("MockTransport mutex poisoned") = body.into();
    }

    /// Make every subsequent request fail with a transport error
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().expect("MockTransport mutex poisoned") = Some(message.into());
    }

    /// Requests seen so far, oldest first
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .expect("MockTransport mutex poisoned")
            .clone()
    }

    /// Clear custom responses, failures and the request log
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn reset(&self) {
        self.responses
            .lock()
            .expect("MockTransport mutex poisoned")
            .clear();
        *self.failure.lock().expect("MockTransport mutex poisoned") = None;
        self.requests
            .lock()
            .expect("MockTransport mutex poisoned")
            .clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(endpoint: &str) -> String {
    Url::parse(endpoint)
        .map(String::from)
        .unwrap_or_else(|_| endpoint.to_string())
}

fn poisoned() -> BitqueryError {
    BitqueryError::transport("MockTransport mutex poisoned")
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, endpoint: &Url, api_key: &str, body: Vec<u8>) -> Result<Bytes> {
        self.requests
            .lock()
            .map_err(|_| poisoned())?
            .push(RecordedRequest {
                endpoint: endpoint.to_string(),
                api_key: api_key.to_string(),
                body,
            });

        if let Some(message) = self.failure.lock().map_err(|_| poisoned())?.clone() {
            return Err(BitqueryError::transport(message));
        }

        let custom = self
            .responses
            .lock()
            .map_err(|_| poisoned())?
            .get(endpoint.as_str())
            .cloned();
        if let Some(response) = custom {
            return Ok(response);
        }

        Ok(self.default_response.lock().map_err(|_| poisoned())?.clone())
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use super::*;
    use crate::config::HttpConfig;
    use reqwest::header::{HeaderValue, CONTENT_TYPE};

    /// HTTP transport backed by a pooled `reqwest::Client`
    ///
    /// Cloning is cheap and clones share the connection pool.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: reqwest::Client,
    }

    impl HttpTransport {
        /// Create a transport from configuration
        pub fn new(config: &HttpConfig) -> Result<Self> {
            let mut builder = reqwest::Client::builder().timeout(config.timeout);
            if let Some(user_agent) = &config.user_agent {
                builder = builder.user_agent(user_agent.as_str());
            }
            let client = builder
                .build()
                .map_err(|e| BitqueryError::InvalidRequest(format!("failed to build HTTP client: {}", e)))?;
            Ok(Self { client })
        }

        /// Use an existing client, keeping its timeout and pool settings
        pub fn from_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl Transport for HttpTransport {
        async fn post(&self, endpoint: &Url, api_key: &str, body: Vec<u8>) -> Result<Bytes> {
            let mut key = HeaderValue::from_str(api_key).map_err(|_| {
                BitqueryError::InvalidRequest("API key is not a valid header value".to_string())
            })?;
            key.set_sensitive(true);

            tracing::debug!("POST {} ({} bytes)", endpoint, body.len());

            let response = self
                .client
                .post(endpoint.clone())
                .header(CONTENT_TYPE, "application/json")
                .header(API_KEY_HEADER, key)
                .body(body)
                .send()
                .await?;

            let status = response.status();
            let bytes = response.bytes().await.map_err(|e| {
                if e.is_timeout() {
                    BitqueryError::from(e)
                } else {
                    BitqueryError::Io(e.to_string())
                }
            })?;

            tracing::debug!("Response from {}: {} ({} bytes)", endpoint, status, bytes.len());
            Ok(bytes)
        }
    }
}
