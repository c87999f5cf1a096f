//! Per-operation invocation capabilities.
//!
//! Each operation kind (query, mutation, subscription) is represented as a
//! small capability value: the transport primitive to call and the rule
//! deciding when the resulting stream is complete. The bridge state
//! machine is shared by all three kinds; only these capabilities differ.

use std::sync::Arc;

use crate::request::GraphQLRequest;
use crate::transport::{CachePolicy, CancelHandle, GraphQLTransport, OnResult};

/// Rule deciding whether a delivered value ends the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionPolicy {
    /// The stream ends after the first delivered value. Used for reads
    /// answered once and for writes.
    Finite,
    /// The stream ends once a server-confirmed value is delivered. Earlier
    /// cache-sourced values are delivered without ending it, which is what
    /// cache-then-network reads need.
    ServerConfirmed,
    /// The stream never ends on a value; only a failure or explicit
    /// cancellation terminates it. Used for long-lived subscriptions.
    Unbounded,
}

impl CompletionPolicy {
    /// The policy a read query completes under.
    ///
    /// `CacheAndNetwork` delivers a cache value first and stays live until
    /// the server answers; every other cache policy produces exactly one
    /// value.
    pub(crate) fn for_query(cache_policy: CachePolicy) -> Self {
        match cache_policy {
            CachePolicy::CacheAndNetwork => Self::ServerConfirmed,
            _ => Self::Finite,
        }
    }
}

pub(crate) type InvokeFn = Box<dyn Fn(OnResult) -> CancelHandle + Send + Sync>;

/// One operation kind bound to its transport primitive and completion
/// rule.
///
/// Stateless beyond its captured parameters; invoked once per bridge call
/// cycle and returns the transport's handle synchronously.
pub(crate) struct OperationProducer {
    pub(crate) policy: CompletionPolicy,
    invoke: InvokeFn,
}

impl OperationProducer {
    /// A read query under the given cache policy.
    pub(crate) fn query(
        transport: Arc<dyn GraphQLTransport>,
        request: GraphQLRequest,
        cache_policy: CachePolicy,
        context_id: Option<String>,
    ) -> Self {
        Self {
            policy: CompletionPolicy::for_query(cache_policy),
            invoke: Box::new(move |on_result| {
                transport.fetch(request.clone(), cache_policy, context_id.clone(), on_result)
            }),
        }
    }

    /// A write mutation.
    pub(crate) fn mutation(transport: Arc<dyn GraphQLTransport>, request: GraphQLRequest) -> Self {
        Self {
            policy: CompletionPolicy::Finite,
            invoke: Box::new(move |on_result| transport.perform(request.clone(), on_result)),
        }
    }

    /// A long-lived subscription over the persistent socket.
    pub(crate) fn subscription(
        transport: Arc<dyn GraphQLTransport>,
        request: GraphQLRequest,
    ) -> Self {
        Self {
            policy: CompletionPolicy::Unbounded,
            invoke: Box::new(move |on_result| {
                transport.open_subscription(request.clone(), on_result)
            }),
        }
    }

    /// Start one network attempt, handing `on_result` to the transport.
    pub(crate) fn invoke(&self, on_result: OnResult) -> CancelHandle {
        (self.invoke)(on_result)
    }

    /// A producer backed by an arbitrary invocation, for tests.
    #[cfg(test)]
    pub(crate) fn scripted(policy: CompletionPolicy, invoke: InvokeFn) -> Self {
        Self { policy, invoke }
    }
}
