//! Demand-driven stream surface for GraphQL operations.
//!
//! An [`OperationStream`] is cold: nothing happens until a consumer
//! attaches, and each attachment is an independent operation attempt with
//! its own bridge. Consumers drive delivery through the returned
//! [`StreamHandle`]: request demand to arm the network call, cancel to
//! walk away. For code that just wants to await values,
//! [`OperationStream::into_stream`] wraps an attachment in a channel-backed
//! async adapter.

use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::bridge::OperationBridge;
use crate::error::GqlError;
use crate::producer::OperationProducer;
use crate::queue::OperationQueue;

/// Receives the values and terminal event of one attachment.
///
/// Implementations use interior mutability: both methods take `&self` and
/// may be called from transport threads as well as reentrantly from the
/// consumer's own reaction to a delivered value.
pub trait Consumer<T>: Send + Sync + 'static {
    /// A value was delivered.
    fn on_value(&self, value: T);

    /// The terminal event: successful completion or a typed failure.
    ///
    /// Called at most once per attachment, and never after the attachment
    /// was cancelled.
    fn on_completion(&self, result: Result<(), GqlError>);
}

type AttachHook = Arc<dyn Fn() + Send + Sync>;
type FailureHook = Arc<dyn Fn(&GqlError) + Send + Sync>;

/// A cold stream of results for one GraphQL operation.
///
/// Produced by the client's `fetch`, `perform`, and `subscribe` methods.
/// The type parameter is the shape the envelope data deserializes into;
/// use [`serde_json::Value`] to consume raw data.
pub struct OperationStream<T> {
    producer: Arc<OperationProducer>,
    queue: Arc<OperationQueue>,
    on_attach: Option<AttachHook>,
    on_failure: Option<FailureHook>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned + Send + 'static> OperationStream<T> {
    pub(crate) fn new(producer: OperationProducer, queue: Arc<OperationQueue>) -> Self {
        Self {
            producer: Arc::new(producer),
            queue,
            on_attach: None,
            on_failure: None,
            _marker: PhantomData,
        }
    }

    /// Install lifecycle observers, used by the client to coordinate the
    /// shared socket connection.
    pub(crate) fn observed(mut self, on_attach: AttachHook, on_failure: FailureHook) -> Self {
        self.on_attach = Some(on_attach);
        self.on_failure = Some(on_failure);
        self
    }

    /// Attach a consumer, returning the handle that drives demand.
    ///
    /// The consumer receives nothing until demand is requested on the
    /// handle. Dropping the handle cancels the attachment, so it must be
    /// kept alive for as long as values are wanted.
    pub fn attach(&self, consumer: impl Consumer<T>) -> StreamHandle<T> {
        self.attach_shared(Arc::new(consumer))
    }

    /// Attach an already-shared consumer.
    pub fn attach_shared(&self, consumer: Arc<dyn Consumer<T>>) -> StreamHandle<T> {
        let consumer: Arc<dyn Consumer<T>> = match &self.on_failure {
            Some(hook) => Arc::new(ObservedConsumer {
                inner: consumer,
                on_failure: hook.clone(),
            }),
            None => consumer,
        };

        let bridge = OperationBridge::new(self.producer.clone(), self.queue.clone(), consumer);
        if let Some(hook) = &self.on_attach {
            hook();
        }
        StreamHandle { bridge }
    }

    /// Attach with unbounded demand and consume asynchronously.
    pub fn into_stream(self) -> DataStream<T> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = self.attach_shared(Arc::new(ChannelConsumer { sender }));
        handle.request(usize::MAX);
        DataStream {
            receiver,
            handle,
            done: false,
        }
    }
}

/// Forwards to the attached consumer while reporting failures to the
/// stream's observer.
struct ObservedConsumer<T> {
    inner: Arc<dyn Consumer<T>>,
    on_failure: FailureHook,
}

impl<T: Send + 'static> Consumer<T> for ObservedConsumer<T> {
    fn on_value(&self, value: T) {
        self.inner.on_value(value);
    }

    fn on_completion(&self, result: Result<(), GqlError>) {
        if let Err(err) = &result {
            (self.on_failure)(err);
        }
        self.inner.on_completion(result);
    }
}

/// Handle held by the consumer side of one attachment.
pub struct StreamHandle<T: 'static> {
    bridge: Arc<OperationBridge<T>>,
}

impl<T: DeserializeOwned + Send + 'static> StreamHandle<T> {
    /// Signal demand for values.
    ///
    /// Demand is presence-only: any nonzero amount arms one network call;
    /// the transport then produces values on the same call until the
    /// operation's completion policy ends the stream. Requesting again
    /// supersedes the outstanding call.
    pub fn request(&self, demand: usize) {
        self.bridge.request(demand);
    }

    /// Cancel the attachment.
    ///
    /// Idempotent and immediate: no value or terminal event reaches the
    /// consumer afterwards, even if a result was already in flight.
    pub fn cancel(&self) {
        self.bridge.cancel();
    }

    /// Whether the attachment can still deliver notifications.
    pub fn is_active(&self) -> bool {
        !self.bridge.is_terminal()
    }
}

impl<T: 'static> Drop for StreamHandle<T> {
    fn drop(&mut self) {
        self.bridge.cancel();
    }
}

/// An event pulled from a [`DataStream`].
#[derive(Debug)]
pub enum StreamEvent<T> {
    /// A delivered value.
    Value(T),
    /// The stream completed successfully.
    Completed,
    /// The stream failed.
    Failed(GqlError),
}

struct ChannelConsumer<T> {
    sender: mpsc::UnboundedSender<StreamEvent<T>>,
}

impl<T: Send + 'static> Consumer<T> for ChannelConsumer<T> {
    fn on_value(&self, value: T) {
        let _ = self.sender.send(StreamEvent::Value(value));
    }

    fn on_completion(&self, result: Result<(), GqlError>) {
        let _ = self.sender.send(match result {
            Ok(()) => StreamEvent::Completed,
            Err(err) => StreamEvent::Failed(err),
        });
    }
}

/// Channel-backed async adapter over one attachment.
///
/// Created by [`OperationStream::into_stream`]. Yields events in delivery
/// order and ends after the terminal event. Dropping the adapter cancels
/// the underlying attachment.
pub struct DataStream<T: 'static> {
    receiver: mpsc::UnboundedReceiver<StreamEvent<T>>,
    handle: StreamHandle<T>,
    done: bool,
}

impl<T: DeserializeOwned + Send + 'static> DataStream<T> {
    /// Await the next event.
    ///
    /// Returns `None` once the terminal event has been consumed or the
    /// stream was cancelled.
    pub async fn next(&mut self) -> Option<StreamEvent<T>> {
        if self.done {
            return None;
        }
        let event = self.receiver.recv().await;
        if !matches!(event, Some(StreamEvent::Value(_))) {
            self.done = true;
        }
        event
    }

    /// Cancel the underlying attachment.
    pub fn cancel(&mut self) {
        self.handle.cancel();
    }
}

impl<T: DeserializeOwned + Send + 'static> futures_util::Stream for DataStream<T> {
    type Item = Result<T, GqlError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        match this.receiver.poll_recv(cx) {
            Poll::Ready(Some(StreamEvent::Value(value))) => Poll::Ready(Some(Ok(value))),
            Poll::Ready(Some(StreamEvent::Completed)) | Poll::Ready(None) => {
                this.done = true;
                Poll::Ready(None)
            }
            Poll::Ready(Some(StreamEvent::Failed(err))) => {
                this.done = true;
                Poll::Ready(Some(Err(err)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
