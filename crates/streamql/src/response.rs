//! GraphQL result envelope types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A GraphQL error returned by the server for an executed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLError {
    /// The error message.
    pub message: String,

    /// Locations in the document where the error occurred.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<GraphQLLocation>,

    /// Path to the field that caused the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,

    /// Additional error metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQLError {
    /// Create an error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: None,
            extensions: None,
        }
    }
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref path) = self.path {
            write!(f, " (at ")?;
            for (i, segment) in path.iter().enumerate() {
                if i > 0 {
                    write!(f, ".")?;
                }
                match segment {
                    PathSegment::Field(name) => write!(f, "{name}")?,
                    PathSegment::Index(idx) => write!(f, "[{idx}]")?,
                }
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::error::Error for GraphQLError {}

/// A location in a GraphQL document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GraphQLLocation {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

/// A segment in an error path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A field name.
    Field(String),
    /// An array index.
    Index(usize),
}

/// Origin of a delivered result.
///
/// Transports with a local result cache may answer a read from the cache
/// before (or instead of) the server. Completion policies use this tag to
/// decide whether a delivered value is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    /// The value came from the transport's local cache.
    Cache,
    /// The value was confirmed by the remote server.
    Server,
}

/// The success envelope of one network attempt.
///
/// "Success" here means the transport completed the attempt; the envelope
/// may still carry operation-level errors, or nothing at all. An envelope
/// with neither data nor errors is interpreted as missing data by the
/// consumer-facing stream.
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    /// The data returned by the operation, if any.
    pub data: Option<Value>,
    /// Errors reported by the server during execution.
    pub errors: Vec<GraphQLError>,
    /// Where the result came from.
    pub source: ResultSource,
}

impl OperationOutcome {
    /// An envelope carrying server-confirmed data.
    pub fn server_data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
            source: ResultSource::Server,
        }
    }

    /// An envelope carrying cache-sourced data.
    pub fn cache_data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
            source: ResultSource::Cache,
        }
    }

    /// An envelope carrying operation-level errors.
    pub fn server_errors(errors: Vec<GraphQLError>) -> Self {
        Self {
            data: None,
            errors,
            source: ResultSource::Server,
        }
    }

    /// An envelope with neither data nor errors.
    pub fn empty() -> Self {
        Self {
            data: None,
            errors: Vec::new(),
            source: ResultSource::Server,
        }
    }
}
