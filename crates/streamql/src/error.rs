//! Error types for GraphQL operation streams.

use std::fmt;

use crate::response::GraphQLError;

/// Transport-level failures reported by the underlying network engine.
///
/// These are the non-GraphQL ways an operation can fail: the server was
/// never reached, the response never parsed, or the persistent socket
/// dropped. Application-level errors returned by an executed operation are
/// carried separately in [`GqlError::Errors`].
#[derive(Debug, Clone)]
pub enum TransportError {
    /// HTTP request failed.
    Request(String),
    /// Request timed out.
    Timeout,
    /// Connection refused, dropped, or failed to establish.
    Connection(String),
    /// Failure on the persistent WebSocket used for subscriptions.
    WebSocket(String),
    /// JSON serialization/deserialization error.
    Json(String),
    /// The operation was cancelled before completing.
    Cancelled,
}

impl TransportError {
    /// Whether this failure means the persistent connection itself is
    /// broken, as opposed to a single operation failing on a healthy
    /// connection.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::WebSocket(_))
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(msg) => write!(f, "HTTP request error: {msg}"),
            Self::Timeout => write!(f, "Request timed out"),
            Self::Connection(msg) => write!(f, "Connection error: {msg}"),
            Self::WebSocket(msg) => write!(f, "WebSocket error: {msg}"),
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
            Self::Cancelled => write!(f, "Operation was cancelled"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Errors surfaced to operation consumers as the terminal failure event.
#[derive(Debug, Clone)]
pub enum GqlError {
    /// The server executed the operation and returned one or more
    /// operation-level errors. Surfaced verbatim, never retried.
    Errors(Vec<GraphQLError>),
    /// The transport reported success but supplied neither data nor
    /// errors. Treated as a protocol violation by the transport.
    MissingData,
    /// A non-GraphQL failure from the underlying transport.
    Transport(TransportError),
}

impl GqlError {
    /// Whether this failure should tear down the shared socket connection
    /// so the next subscription attempt reconnects.
    pub fn is_connection_fault(&self) -> bool {
        matches!(self, Self::Transport(cause) if cause.is_connection_error())
    }

    /// All application-level error messages joined into one string, if any.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Errors(errors) if !errors.is_empty() => Some(
                errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for GqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Errors(errors) => {
                write!(f, "GraphQL errors: ")?;
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{error}")?;
                }
                Ok(())
            }
            Self::MissingData => write!(f, "Response carried neither data nor errors"),
            Self::Transport(cause) => write!(f, "Transport failure: {cause}"),
        }
    }
}

impl std::error::Error for GqlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(cause) => Some(cause),
            _ => None,
        }
    }
}

impl From<TransportError> for GqlError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}
