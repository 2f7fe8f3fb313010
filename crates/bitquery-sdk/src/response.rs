//! GraphQL response envelope and decoding
//!
//! A response body is one of:
//!
//! - an envelope `{"data": ..., "errors": [...]}`,
//! - a bare JSON document without the envelope (some endpoints and fixtures),
//! - a non-JSON page (gateway or auth failure served as HTML).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{BitqueryError, Result};

/// Standard GraphQL response shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    /// Operation result, decoded later against the caller's type
    #[serde(default)]
    pub data: Option<Value>,
    /// Errors reported by the server, in order
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub errors: Vec<QueryError>,
    /// Server-specific metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl Envelope {
    /// Check if the server reported any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Decode `data` into `T`.
    ///
    /// Any reported error fails the call, even when `data` is present.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T> {
        if self.has_errors() {
            return Err(BitqueryError::Query(QueryErrors(self.errors)));
        }
        let data = self.data.unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|e| BitqueryError::Decode(e.to_string()))
    }
}

/// A single GraphQL error reported by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryError {
    /// Error message
    pub message: String,
    /// Positions in the query document the error refers to
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub locations: Vec<Location>,
    /// Path to the field that failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    /// Server-specific metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl QueryError {
    /// Create an error with only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: None,
            extensions: None,
        }
    }

    /// Add a source location
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.locations.push(Location { line, column });
        self
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if !self.locations.is_empty() {
            let locations: Vec<String> = self.locations.iter().map(|l| l.to_string()).collect();
            write!(f, " (at {})", locations.join(", "))?;
        }
        Ok(())
    }
}

/// Source location (1-indexed) in a query document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Line number
    pub line: u32,
    /// Column number
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Every error the server reported for one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryErrors(Vec<QueryError>);

impl QueryErrors {
    /// Reported messages, in order
    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.message.as_str()).collect()
    }

    /// Iterate over the reported errors
    pub fn iter(&self) -> std::slice::Iter<'_, QueryError> {
        self.0.iter()
    }

    /// Number of reported errors
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no errors
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take ownership of the reported errors
    pub fn into_inner(self) -> Vec<QueryError> {
        self.0
    }
}

impl From<Vec<QueryError>> for QueryErrors {
    fn from(errors: Vec<QueryError>) -> Self {
        Self(errors)
    }
}

impl<'a> IntoIterator for &'a QueryErrors {
    type Item = &'a QueryError;
    type IntoIter = std::slice::Iter<'a, QueryError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for QueryErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

/// Decode a raw response body into `T`.
///
/// Enveloped responses are unwrapped through [`Envelope::into_data`]. A JSON
/// object with neither `data` nor `errors` is decoded as a bare document. A
/// body that is not JSON because it starts with `<`, or because the parser ran
/// into a `<` where a JSON value was expected, is reported as
/// [`BitqueryError::UnexpectedResponse`] with the raw text attached.
pub fn decode_response<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let document: Value = match serde_json::from_slice(body) {
        Ok(document) => document,
        Err(e) => {
            if looks_like_markup(body) || markup_at_error(body, &e) {
                return Err(BitqueryError::UnexpectedResponse {
                    body: String::from_utf8_lossy(body).into_owned(),
                });
            }
            return Err(BitqueryError::Decode(e.to_string()));
        }
    };

    if !is_envelope(&document) {
        tracing::trace!("Response has no envelope, decoding bare document");
        return serde_json::from_value(document).map_err(|e| BitqueryError::Decode(e.to_string()));
    }

    let envelope: Envelope = serde_json::from_value(document)
        .map_err(|e| BitqueryError::Decode(format!("malformed response envelope: {}", e)))?;
    if envelope.has_errors() {
        tracing::debug!("Server reported {} query error(s)", envelope.errors.len());
    }
    envelope.into_data()
}

fn is_envelope(document: &Value) -> bool {
    match document {
        Value::Object(map) => map.contains_key("data") || map.contains_key("errors"),
        _ => false,
    }
}

fn looks_like_markup(body: &[u8]) -> bool {
    body.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'<')
}

/// Whether the byte the parser stopped at is `<`.
///
/// `line` and `column` are 1-based; `column` counts bytes within the line.
fn markup_at_error(body: &[u8], error: &serde_json::Error) -> bool {
    if error.line() == 0 || error.column() == 0 {
        return false;
    }
    body.split(|&b| b == b'\n')
        .nth(error.line() - 1)
        .and_then(|line| line.get(error.column() - 1))
        .is_some_and(|&b| b == b'<')
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
