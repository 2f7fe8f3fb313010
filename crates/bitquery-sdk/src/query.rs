//! Query descriptors and the request body sent to the API

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{BitqueryError, Result};

/// Bitquery v1 GraphQL endpoint
pub const GRAPHQL_ENDPOINT: &str = "https://graphql.bitquery.io";

/// Bitquery v2 (streaming) GraphQL endpoint
pub const STREAMING_ENDPOINT: &str = "https://streaming.bitquery.io/graphql";

/// A GraphQL query the client can execute.
///
/// Callers implement this for their own query types:
///
/// ```rust
/// use bitquery_sdk::{Query, STREAMING_ENDPOINT};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct BlockVars {
///     network: String,
///     limit: u32,
/// }
///
/// struct LatestBlocks {
///     network: String,
/// }
///
/// impl Query for LatestBlocks {
///     type Variables = BlockVars;
///
///     fn variables(&self) -> BlockVars {
///         BlockVars { network: self.network.clone(), limit: 10 }
///     }
///
///     fn query(&self) -> &str {
///         "query ($network: evm_network, $limit: Int) { EVM(network: $network) { Blocks(limit: {count: $limit}) { Block { Number } } } }"
///     }
///
///     fn endpoint(&self) -> &str {
///         STREAMING_ENDPOINT
///     }
/// }
/// ```
pub trait Query {
    /// Variables type; must serialize to a JSON object (or null for none)
    type Variables: Serialize;

    /// Variable name to value mapping
    fn variables(&self) -> Self::Variables;

    /// The GraphQL document
    fn query(&self) -> &str;

    /// Endpoint URL, usually [`GRAPHQL_ENDPOINT`] or [`STREAMING_ENDPOINT`]
    fn endpoint(&self) -> &str;
}

impl<Q: Query + ?Sized> Query for &Q {
    type Variables = Q::Variables;

    fn variables(&self) -> Self::Variables {
        (**self).variables()
    }

    fn query(&self) -> &str {
        (**self).query()
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

impl<Q: Query + ?Sized> Query for Box<Q> {
    type Variables = Q::Variables;

    fn variables(&self) -> Self::Variables {
        (**self).variables()
    }

    fn query(&self) -> &str {
        (**self).query()
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// JSON body of a GraphQL POST
#[derive(Debug, Clone, Serialize)]
pub struct RequestBody<'a> {
    /// The GraphQL document
    pub query: &'a str,
    /// Variables object
    pub variables: Map<String, Value>,
}

impl<'a> RequestBody<'a> {
    /// Build the body for a query, checking its variables form a JSON object
    pub fn from_query<Q: Query + ?Sized>(query: &'a Q) -> Result<Self> {
        let variables = match serde_json::to_value(query.variables()) {
            Ok(Value::Object(map)) => map,
            Ok(Value::Null) => Map::new(),
            Ok(other) => {
                return Err(BitqueryError::Serialization(format!(
                    "variables must serialize to a JSON object, got {}",
                    json_kind(&other)
                )))
            }
            Err(e) => return Err(BitqueryError::Serialization(e.to_string())),
        };
        Ok(Self {
            query: query.query(),
            variables,
        })
    }

    /// Serialize to the bytes sent on the wire
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| BitqueryError::Serialization(e.to_string()))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Ready-made query for ad-hoc use
///
/// ```rust
/// use bitquery_sdk::{GraphQLRequest, GRAPHQL_ENDPOINT};
///
/// let request = GraphQLRequest::new("query ($limit: Int) { bitcoin { blocks(options: {limit: $limit}) { height } } }")
///     .with_endpoint(GRAPHQL_ENDPOINT)
///     .variable("limit", 5);
/// ```
#[derive(Debug, Clone)]
pub struct GraphQLRequest {
    query: String,
    endpoint: String,
    variables: Map<String, Value>,
    invalid_variable: Option<String>,
}

impl GraphQLRequest {
    /// Create a request for the streaming endpoint with no variables
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            endpoint: STREAMING_ENDPOINT.to_string(),
            variables: Map::new(),
            invalid_variable: None,
        }
    }

    /// Set the endpoint URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set a variable.
    ///
    /// A value that cannot be converted to JSON is reported when the request
    /// is executed.
    pub fn variable(mut self, name: impl Into<String>, value: impl Serialize) -> Self {
        let name = name.into();
        match serde_json::to_value(value) {
            Ok(value) => {
                self.variables.insert(name, value);
            }
            Err(e) => {
                if self.invalid_variable.is_none() {
                    self.invalid_variable = Some(format!("variable `{}`: {}", name, e));
                }
            }
        }
        self
    }

    /// Add every entry of a name to value mapping
    pub fn with_variables<K, V>(mut self, variables: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Serialize,
    {
        for (name, value) in variables {
            self = self.variable(name, value);
        }
        self
    }

    /// Current variables
    pub fn variable_map(&self) -> &Map<String, Value> {
        &self.variables
    }
}

impl Query for GraphQLRequest {
    type Variables = VariableMap;

    fn variables(&self) -> VariableMap {
        match &self.invalid_variable {
            Some(message) => VariableMap::Invalid(message.clone()),
            None => VariableMap::Valid(self.variables.clone()),
        }
    }

    fn query(&self) -> &str {
        &self.query
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Variables of a [`GraphQLRequest`]; serialization fails if any value was rejected
#[derive(Debug, Clone)]
pub enum VariableMap {
    /// All values converted
    Valid(Map<String, Value>),
    /// A value failed to convert
    Invalid(String),
}

impl Serialize for VariableMap {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            VariableMap::Valid(map) => map.serialize(serializer),
            VariableMap::Invalid(message) => Err(serde::ser::Error::custom(message)),
        }
    }
}
