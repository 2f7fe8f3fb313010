//! # bitquery-sdk
//!
//! Rust client for the Bitquery blockchain-data GraphQL API.
//!
//! ## Features
//!
//! - **BitqueryClient**: sends `{query, variables}` with the `X-API-KEY` header
//! - **Query**: trait for caller-defined queries, plus the ad-hoc [`GraphQLRequest`]
//! - **Response decoding**: unwraps the `{data, errors}` envelope into any
//!   `serde` type, falls back to bare JSON, detects HTML error pages
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bitquery_sdk::{BitqueryClient, GraphQLRequest, GRAPHQL_ENDPOINT};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Blocks {
//!     bitcoin: Bitcoin,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! struct Bitcoin {
//!     blocks: Vec<Block>,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! struct Block {
//!     height: u64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BitqueryClient::new()?;
//!
//!     let request = GraphQLRequest::new(
//!         "query ($limit: Int) { bitcoin { blocks(options: {limit: $limit, desc: \"height\"}) { height } } }",
//!     )
//!     .with_endpoint(GRAPHQL_ENDPOINT)
//!     .variable("limit", 5);
//!
//!     let blocks: Blocks = client.execute_and_decode("my-api-key", &request).await?;
//!     for block in blocks.bitcoin.blocks {
//!         println!("{}", block.height);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod client;
pub mod config;
mod error;
pub mod query;
pub mod response;
mod transport;

// Re-export main types
pub use client::BitqueryClient;
pub use config::{HttpConfig, DEFAULT_TIMEOUT};
pub use error::{BitqueryError, Result};
pub use query::{GraphQLRequest, Query, GRAPHQL_ENDPOINT, STREAMING_ENDPOINT};
pub use response::{decode_response, Envelope, Location, QueryError, QueryErrors};
pub use transport::{MockTransport, RecordedRequest, API_KEY_HEADER};

/// Re-export Transport trait for custom implementations
pub use transport::Transport;

#[cfg(feature = "http")]
pub use transport::HttpTransport;

/// Re-export the URL type used by [`Transport`]
pub use url::Url;
