//! BitqueryClient - main GraphQL client

use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

use crate::error::Result;
use crate::query::{Query, RequestBody};
use crate::response::decode_response;
use crate::transport::{MockTransport, Transport};

#[cfg(feature = "http")]
use crate::config::HttpConfig;
#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// Bitquery GraphQL client
///
/// Holds one transport for its whole lifetime. Clones share it, so a single
/// client (and its connection pool) can serve concurrent calls from many tasks.
#[derive(Clone)]
pub struct BitqueryClient {
    transport: Arc<dyn Transport>,
}

impl BitqueryClient {
    /// Create a client with HTTP transport and the default 40 second timeout
    #[cfg(feature = "http")]
    pub fn new() -> Result<Self> {
        Self::with_config(HttpConfig::default())
    }

    /// Create a client with HTTP transport from configuration
    #[cfg(feature = "http")]
    pub fn with_config(config: HttpConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(&config)?))
    }

    /// Create a new client with mock transport (for testing)
    pub fn new_mock() -> Self {
        Self::with_transport(MockTransport::new())
    }

    /// Create a client with a custom transport
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Send a query and return the raw response body.
    ///
    /// Exactly one POST is made. The body is returned whatever the HTTP
    /// status was.
    pub async fn execute<Q: Query + ?Sized>(&self, api_key: &str, query: &Q) -> Result<Bytes> {
        let body = RequestBody::from_query(query)?.to_bytes()?;
        let endpoint = Url::parse(query.endpoint())?;
        self.transport.post(&endpoint, api_key, body).await
    }

    /// Send a query and decode the response into `T`.
    ///
    /// See [`decode_response`] for how enveloped, bare and non-JSON bodies
    /// are handled.
    pub async fn execute_and_decode<T, Q>(&self, api_key: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Query + ?Sized,
    {
        let body = self.execute(api_key, query).await?;
        decode_response(&body)
    }
}

impl std::fmt::Debug for BitqueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitqueryClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BitqueryError;
    use crate::query::{GraphQLRequest, GRAPHQL_ENDPOINT, STREAMING_ENDPOINT};
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Point {
        x: i64,
    }

    #[tokio::test]
    async fn test_client_mock_default_response() {
        let client = BitqueryClient::new_mock();
        let request = GraphQLRequest::new("{ ping }");
        let data: Option<Value> = client.execute_and_decode("key", &request).await.unwrap();
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn test_execute_sends_body_to_query_endpoint() {
        let transport = MockTransport::new();
        let client = BitqueryClient::with_transport(transport.clone());
        let request = GraphQLRequest::new("{ ping }")
            .with_endpoint(GRAPHQL_ENDPOINT)
            .variable("limit", 10);

        client.execute("my-key", &request).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].endpoint, "https://graphql.bitquery.io/");
        assert_eq!(requests[0].api_key, "my-key");
        assert_eq!(
            requests[0].body,
            br#"{"query":"{ ping }","variables":{"limit":10}}"#.to_vec()
        );
    }

    #[tokio::test]
    async fn test_execute_returns_body_unaltered() {
        let transport = MockTransport::new();
        transport.set_response(STREAMING_ENDPOINT, "  not json at all \n");
        let client = BitqueryClient::with_transport(transport);

        let body = client
            .execute("key", &GraphQLRequest::new("{ ping }"))
            .await
            .unwrap();
        assert_eq!(body.as_ref(), b"  not json at all \n");
    }

    #[tokio::test]
    async fn test_invalid_endpoint_makes_no_request() {
        let transport = MockTransport::new();
        let client = BitqueryClient::with_transport(transport.clone());
        let request = GraphQLRequest::new("{ ping }").with_endpoint("graphql.bitquery.io");

        let err = client.execute("key", &request).await.unwrap_err();
        assert!(matches!(err, BitqueryError::InvalidRequest(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_execute_and_decode_enveloped() {
        let transport = MockTransport::new();
        transport.set_default_response(r#"{"data": {"x": 1}, "errors": []}"#);
        let client = BitqueryClient::with_transport(transport);

        let point: Point = client
            .execute_and_decode("key", &GraphQLRequest::new("{ x }"))
            .await
            .unwrap();
        assert_eq!(point, Point { x: 1 });
    }

    #[tokio::test]
    async fn test_transport_error_propagates_unchanged() {
        let transport = MockTransport::new();
        transport.fail_with("dns lookup failed");
        let client = BitqueryClient::with_transport(transport);

        let err = client
            .execute_and_decode::<Point, _>("key", &GraphQLRequest::new("{ x }"))
            .await
            .unwrap_err();
        match err {
            BitqueryError::Transport { message, timed_out } => {
                assert_eq!(message, "dns lookup failed");
                assert!(!timed_out);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
