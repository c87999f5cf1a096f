//! Default client wiring producers, bridges, and the socket coordinator.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::connection::SocketCoordinator;
use crate::producer::OperationProducer;
use crate::queue::OperationQueue;
use crate::request::GraphQLRequest;
use crate::stream::OperationStream;
use crate::transport::{CachePolicy, GraphQLTransport};

/// A client executing GraphQL operations as demand-driven streams.
///
/// Every method is cold: it builds a stream describing the operation, and
/// each consumer attachment to that stream is one independent network
/// attempt.
pub trait GqlClient {
    /// Execute a read query under the given cache policy.
    fn fetch<T: DeserializeOwned + Send + 'static>(
        &self,
        query: GraphQLRequest,
        cache_policy: CachePolicy,
    ) -> OperationStream<T>;

    /// Execute a write mutation.
    fn perform<T: DeserializeOwned + Send + 'static>(
        &self,
        mutation: GraphQLRequest,
    ) -> OperationStream<T>;

    /// Subscribe to a long-lived subscription over the persistent socket.
    fn subscribe<T: DeserializeOwned + Send + 'static>(
        &self,
        subscription: GraphQLRequest,
    ) -> OperationStream<T>;
}

/// Builder for [`DefaultGqlClient`].
pub struct DefaultGqlClientBuilder {
    transport: Arc<dyn GraphQLTransport>,
    queue_name: String,
}

impl DefaultGqlClientBuilder {
    /// Create a builder for a client over the given transport.
    pub fn new(transport: Arc<dyn GraphQLTransport>) -> Self {
        Self {
            transport,
            queue_name: "gql-operation".to_string(),
        }
    }

    /// Name for the client's operation submission thread.
    pub fn queue_name(mut self, name: impl Into<String>) -> Self {
        self.queue_name = name.into();
        self
    }

    /// Build the client.
    pub fn build(self) -> DefaultGqlClient {
        let socket = SocketCoordinator::new(self.transport.clone());
        DefaultGqlClient {
            inner: Arc::new(ClientInner {
                transport: self.transport,
                queue: Arc::new(OperationQueue::new(self.queue_name)),
                socket: Arc::new(socket),
            }),
        }
    }
}

struct ClientInner {
    transport: Arc<dyn GraphQLTransport>,
    queue: Arc<OperationQueue>,
    socket: Arc<SocketCoordinator>,
}

/// The default [`GqlClient`] implementation.
///
/// Owns one operation submission queue and the socket lifecycle state for
/// its transport. Cloning is cheap and shares both.
///
/// # Example
///
/// ```ignore
/// use streamql::{CachePolicy, DefaultGqlClient, GqlClient, GraphQLRequest, StreamEvent};
///
/// let client = DefaultGqlClient::new(transport);
///
/// let mut results = client
///     .fetch::<serde_json::Value>(
///         GraphQLRequest::query("{ viewer { login } }"),
///         CachePolicy::CacheFirst,
///     )
///     .into_stream();
///
/// while let Some(event) = results.next().await {
///     match event {
///         StreamEvent::Value(data) => println!("data: {data}"),
///         StreamEvent::Completed => break,
///         StreamEvent::Failed(err) => return Err(err.into()),
///     }
/// }
/// ```
#[derive(Clone)]
pub struct DefaultGqlClient {
    inner: Arc<ClientInner>,
}

impl DefaultGqlClient {
    /// Create a client over the given transport with default settings.
    pub fn new(transport: Arc<dyn GraphQLTransport>) -> Self {
        Self::builder(transport).build()
    }

    /// Create a builder for configuring the client.
    pub fn builder(transport: Arc<dyn GraphQLTransport>) -> DefaultGqlClientBuilder {
        DefaultGqlClientBuilder::new(transport)
    }

    /// Execute a read query with an explicit per-call context identifier.
    ///
    /// The identifier is forwarded verbatim to the transport, which may use
    /// it to scope or deduplicate cache notifications for this call.
    pub fn fetch_with_context<T: DeserializeOwned + Send + 'static>(
        &self,
        query: GraphQLRequest,
        cache_policy: CachePolicy,
        context_id: Option<String>,
    ) -> OperationStream<T> {
        OperationStream::new(
            OperationProducer::query(
                self.inner.transport.clone(),
                query,
                cache_policy,
                context_id,
            ),
            self.inner.queue.clone(),
        )
    }

    /// Replace the payload sent when establishing the socket connection.
    ///
    /// Applied to the live connection as well, so rotated credentials take
    /// effect without waiting for the next reconnect.
    pub fn update_connecting_payload(&self, payload: Value) {
        tracing::debug!(target: "streamql::client", "updating socket connecting payload");
        self.inner.transport.update_connecting_payload(payload, true);
    }
}

impl GqlClient for DefaultGqlClient {
    fn fetch<T: DeserializeOwned + Send + 'static>(
        &self,
        query: GraphQLRequest,
        cache_policy: CachePolicy,
    ) -> OperationStream<T> {
        self.fetch_with_context(query, cache_policy, None)
    }

    fn perform<T: DeserializeOwned + Send + 'static>(
        &self,
        mutation: GraphQLRequest,
    ) -> OperationStream<T> {
        OperationStream::new(
            OperationProducer::mutation(self.inner.transport.clone(), mutation),
            self.inner.queue.clone(),
        )
    }

    fn subscribe<T: DeserializeOwned + Send + 'static>(
        &self,
        subscription: GraphQLRequest,
    ) -> OperationStream<T> {
        let started = self.inner.socket.clone();
        let failed = self.inner.socket.clone();

        OperationStream::new(
            OperationProducer::subscription(self.inner.transport.clone(), subscription),
            self.inner.queue.clone(),
        )
        .observed(
            Arc::new(move || started.subscription_started()),
            Arc::new(move |error| failed.subscription_failed(error)),
        )
    }
}

impl fmt::Debug for DefaultGqlClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultGqlClient").finish_non_exhaustive()
    }
}
