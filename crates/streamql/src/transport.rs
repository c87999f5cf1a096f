//! The boundary to the underlying GraphQL execution engine.
//!
//! This crate does not perform HTTP calls, socket framing, or caching
//! itself; it orchestrates a transport that does. The transport exposes
//! three callback-based primitives (one per operation kind), each returning
//! a [`CancelHandle`] synchronously while results arrive asynchronously,
//! plus explicit control over the persistent socket connection used by
//! subscriptions.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::TransportError;
use crate::request::GraphQLRequest;
use crate::response::OperationOutcome;

/// How a query interacts with the transport's local result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Return cached data if present, otherwise fetch from the server.
    #[default]
    CacheFirst,
    /// Always fetch from the server, updating the cache with the result.
    NetworkOnly,
    /// Always fetch from the server, bypassing the cache entirely.
    NoCache,
    /// Return cached data if present, never fetch.
    CacheOnly,
    /// Return cached data immediately, then also fetch from the server.
    CacheAndNetwork,
}

/// Callback through which the transport reports the results of one
/// operation.
///
/// For queries and mutations the callback fires once; for subscriptions
/// (and cache-then-network reads) it may fire any number of times on the
/// same handle. The transport may invoke it from any thread.
pub type OnResult = Box<dyn Fn(Result<OperationOutcome, TransportError>) + Send + Sync>;

/// A handle to an in-flight operation that can be cancelled.
///
/// Cancellation is idempotent: the first `cancel()` runs the transport's
/// cancellation action, later calls are no-ops.
#[derive(Clone)]
pub struct CancelHandle {
    action: Arc<Mutex<Option<Box<dyn FnOnce() + Send>>>>,
}

impl CancelHandle {
    /// Create a handle that runs `on_cancel` when first cancelled.
    pub fn new(on_cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            action: Arc::new(Mutex::new(Some(Box::new(on_cancel)))),
        }
    }

    /// A handle with nothing to cancel.
    ///
    /// Useful for transport paths that complete synchronously, such as
    /// cache-only reads.
    pub fn noop() -> Self {
        Self {
            action: Arc::new(Mutex::new(None)),
        }
    }

    /// Cancel the operation.
    ///
    /// Returns `true` if the cancellation action ran, `false` if the
    /// handle was already cancelled or had nothing to cancel.
    pub fn cancel(&self) -> bool {
        let action = self.action.lock().take();
        match action {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }

    /// Check whether the cancellation action has not yet run.
    pub fn is_pending(&self) -> bool {
        self.action.lock().is_some()
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// The callback-based execution engine this crate bridges.
///
/// Implementations own the wire protocols, serialization, and caching.
/// Every primitive must return its handle synchronously and deliver
/// results through the supplied callback, on any thread it chooses.
pub trait GraphQLTransport: Send + Sync + 'static {
    /// Execute a read query under the given cache policy.
    ///
    /// `context_id` is an opaque per-call token forwarded from the caller,
    /// used by transports that deduplicate or scope cache notifications.
    fn fetch(
        &self,
        request: GraphQLRequest,
        cache_policy: CachePolicy,
        context_id: Option<String>,
        on_result: OnResult,
    ) -> CancelHandle;

    /// Execute a write mutation.
    fn perform(&self, request: GraphQLRequest, on_result: OnResult) -> CancelHandle;

    /// Register a long-lived subscription on the persistent socket.
    ///
    /// The callback keeps firing for every pushed value until the handle
    /// is cancelled or the transport reports a failure.
    fn open_subscription(&self, request: GraphQLRequest, on_result: OnResult) -> CancelHandle;

    /// Open (or re-open) the persistent socket connection.
    fn resume_connection(&self, auto_reconnect: bool);

    /// Close the persistent socket connection.
    fn pause_connection(&self);

    /// Replace the payload sent when establishing the socket connection.
    fn update_connecting_payload(&self, payload: Value, reconnect_if_connected: bool);
}
