//! Socket lifecycle coordination for streaming subscriptions.
//!
//! The persistent duplex connection is opened lazily: only once the first
//! subscription attaches does the transport get told to connect. A failed
//! connection handshake is not fatal to the transport on its own; it must
//! be told to retry, and retries should only happen from a fresh
//! subscription request so the application stays in control. The
//! coordinator therefore tears the connection down when a connection-level
//! fault surfaces on any subscription, which re-arms the lazy connect for
//! the next attempt.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::GqlError;
use crate::transport::GraphQLTransport;

/// Tracks whether the shared socket connection is up.
///
/// One per client, shared across all of its streaming attachments. The
/// flag has its own lock, distinct from any bridge's.
pub(crate) struct SocketCoordinator {
    transport: Arc<dyn GraphQLTransport>,
    connected: Mutex<bool>,
}

impl SocketCoordinator {
    pub(crate) fn new(transport: Arc<dyn GraphQLTransport>) -> Self {
        Self {
            transport,
            connected: Mutex::new(false),
        }
    }

    /// A streaming attachment handed its consumer a live handle.
    ///
    /// Opens the socket on the first one; later attachments reuse it.
    pub(crate) fn subscription_started(&self) {
        let mut connected = self.connected.lock();
        if !*connected {
            tracing::debug!(target: "streamql::connection", "resuming socket connection");
            self.transport.resume_connection(true);
            *connected = true;
        }
    }

    /// A streaming attachment failed.
    ///
    /// Only connection-level faults tear the socket down; application
    /// errors leave it untouched. The failed subscription itself is never
    /// re-issued here.
    pub(crate) fn subscription_failed(&self, error: &GqlError) {
        if !error.is_connection_fault() {
            return;
        }

        let mut connected = self.connected.lock();
        tracing::debug!(
            target: "streamql::connection",
            "pausing socket connection after fault: {error}"
        );
        self.transport.pause_connection();
        *connected = false;
    }
}
