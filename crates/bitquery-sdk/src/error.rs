//! SDK error types

use thiserror::Error;

use crate::response::QueryErrors;

/// SDK error type
#[derive(Debug, Error)]
pub enum BitqueryError {
    /// Query variables could not be represented as a JSON object
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The HTTP request could not be constructed (bad endpoint URL, bad header value)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network failure: DNS, TLS, connection refused or timeout
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the underlying failure
        message: String,
        /// Whether the client-wide timeout elapsed
        timed_out: bool,
    },

    /// The response body could not be read completely
    #[error("I/O error: {0}")]
    Io(String),

    /// The server answered with something that is not JSON, usually an HTML error page
    #[error("Unexpected response format: {body}")]
    UnexpectedResponse {
        /// Raw response text
        body: String,
    },

    /// The response (or its `data` field) did not match the requested type
    #[error("Decode error: {0}")]
    Decode(String),

    /// The server reported one or more GraphQL errors
    #[error("Query error: {0}")]
    Query(QueryErrors),
}

impl BitqueryError {
    /// Create a transport error that is not a timeout
    pub fn transport(message: impl Into<String>) -> Self {
        BitqueryError::Transport {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Returns true if the request was aborted by the client timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, BitqueryError::Transport { timed_out: true, .. })
    }

    /// The GraphQL errors reported by the server, if this is a query error
    pub fn query_errors(&self) -> Option<&QueryErrors> {
        match self {
            BitqueryError::Query(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for BitqueryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            BitqueryError::InvalidRequest(e.to_string())
        } else if e.is_body() || e.is_decode() {
            BitqueryError::Io(e.to_string())
        } else {
            BitqueryError::Transport {
                message: e.to_string(),
                timed_out: e.is_timeout(),
            }
        }
    }
}

impl From<url::ParseError> for BitqueryError {
    fn from(e: url::ParseError) -> Self {
        BitqueryError::InvalidRequest(format!("invalid endpoint URL: {}", e))
    }
}

/// A specialized Result type for SDK operations
pub type Result<T> = std::result::Result<T, BitqueryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::QueryError;

    #[test]
    fn test_transport_helper_is_not_timeout() {
        let err = BitqueryError::transport("connection refused");
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn test_timeout_flag() {
        let err = BitqueryError::Transport {
            message: "operation timed out".to_string(),
            timed_out: true,
        };
        assert!(err.is_timeout());
    }

    #[test]
    fn test_query_errors_accessor() {
        let err = BitqueryError::Query(QueryErrors::from(vec![QueryError::new("bad field")]));
        let errors = err.query_errors().unwrap();
        assert_eq!(errors.messages(), vec!["bad field"]);
        assert!(err.to_string().contains("bad field"));

        assert!(BitqueryError::Decode("x".into()).query_errors().is_none());
    }

    #[test]
    fn test_url_parse_error_is_invalid_request() {
        let err: BitqueryError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, BitqueryError::InvalidRequest(_)));
    }

    #[test]
    fn test_unexpected_response_keeps_body() {
        let err = BitqueryError::UnexpectedResponse {
            body: "<html>502 Bad Gateway</html>".to_string(),
        };
        assert!(err.to_string().contains("<html>502 Bad Gateway</html>"));
    }
}
