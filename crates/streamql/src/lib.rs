//! Demand-driven reactive streams over callback-based GraphQL clients.
//!
//! This crate adapts a callback-initiated GraphQL execution engine (one
//! that can run a read query, perform a write mutation, or hold a
//! long-lived subscription over a persistent socket) into a uniform,
//! demand-driven stream interface that application code can compose,
//! cancel, and observe without knowing anything about the transport:
//!
//! - **Operation streams**: `fetch`, `perform`, and `subscribe` each
//!   return a cold [`OperationStream`]; every consumer attachment is one
//!   independent network attempt driven by explicit demand.
//! - **Completion policies**: one value ends a query or mutation, a
//!   server-confirmed value ends a cache-then-network read, and only a
//!   failure or cancellation ends a subscription.
//! - **Socket lifecycle**: the persistent connection used by
//!   subscriptions opens lazily on the first attachment and is torn down
//!   on connection-level faults so the next attempt can reconnect.
//!
//! # Attaching a consumer
//!
//! The raw surface is pull-based: attach a [`Consumer`], then request
//! demand on the returned handle.
//!
//! ```ignore
//! use streamql::{CachePolicy, Consumer, DefaultGqlClient, GqlClient, GraphQLRequest};
//!
//! let client = DefaultGqlClient::new(transport);
//! let stream = client.fetch::<serde_json::Value>(
//!     GraphQLRequest::query("{ users { id name } }"),
//!     CachePolicy::CacheFirst,
//! );
//!
//! let handle = stream.attach(PrintingConsumer);
//! handle.request(1);
//! // ... handle.cancel() to walk away early; dropping it does the same.
//! ```
//!
//! # Awaiting values
//!
//! [`OperationStream::into_stream`] wraps an attachment in an async
//! adapter that also implements [`futures_util::Stream`].
//!
//! ```ignore
//! let mut events = client
//!     .subscribe::<serde_json::Value>(GraphQLRequest::subscription(
//!         "subscription { messageAdded { id body } }",
//!     ))
//!     .into_stream();
//!
//! while let Some(event) = events.next().await {
//!     println!("{event:?}");
//! }
//! ```
//!
//! # The transport boundary
//!
//! This crate performs no I/O. Implement [`GraphQLTransport`] over your
//! execution engine: three callback-based primitives returning a
//! [`CancelHandle`] each, plus pause/resume control over the subscription
//! socket. The crate guarantees each attachment sees zero or more values
//! followed by at most one terminal event, and nothing at all after
//! cancellation.

mod bridge;
mod client;
mod connection;
mod error;
mod producer;
mod queue;
mod request;
mod response;
mod stream;
mod transport;

pub use client::{DefaultGqlClient, DefaultGqlClientBuilder, GqlClient};
pub use error::{GqlError, TransportError};
pub use producer::CompletionPolicy;
pub use request::{GraphQLRequest, OperationType};
pub use response::{
    GraphQLError, GraphQLLocation, OperationOutcome, PathSegment, ResultSource,
};
pub use stream::{Consumer, DataStream, OperationStream, StreamEvent, StreamHandle};
pub use transport::{CachePolicy, CancelHandle, GraphQLTransport, OnResult};
