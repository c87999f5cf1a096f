//! Demand-driven bridge between one consumer and one operation attempt.
//!
//! The bridge is the state machine at the heart of the crate: it turns a
//! callback-based network primitive into a pull-driven producer. Demand
//! from the consumer arms a network call; results from the transport are
//! interpreted under the operation's [`CompletionPolicy`] and forwarded as
//! value and terminal notifications. Either side can end the attachment at
//! any time: the consumer by cancelling, the transport by failing.
//!
//! Delivering a value may synchronously re-enter the bridge from the
//! consumer's reaction (more demand, or cancellation), so every entry
//! point runs under one reentrant lock per bridge. State borrows are
//! released before the consumer is invoked; the lock itself stays held
//! across delivery so a cancel from another thread cannot interleave with
//! an in-progress notification.

use std::cell::RefCell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use serde::de::DeserializeOwned;

use crate::error::{GqlError, TransportError};
use crate::producer::{CompletionPolicy, OperationProducer};
use crate::queue::OperationQueue;
use crate::response::{OperationOutcome, ResultSource};
use crate::stream::Consumer;
use crate::transport::{CancelHandle, OnResult};

/// Where the bridge is in its call cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No call issued yet.
    Idle,
    /// Demand arrived; the call submission is queued.
    Requested,
    /// A call is outstanding; results may arrive at any time.
    AwaitingResult,
    /// A terminal event was sent, or the consumer cancelled. Final.
    Terminal,
}

struct BridgeState<T> {
    consumer: Option<Arc<dyn Consumer<T>>>,
    active_call: Option<CancelHandle>,
    phase: Phase,
}

/// State machine binding one consumer to one operation invocation.
pub(crate) struct OperationBridge<T> {
    producer: Arc<OperationProducer>,
    queue: Arc<OperationQueue>,
    state: ReentrantMutex<RefCell<BridgeState<T>>>,
}

impl<T: 'static> OperationBridge<T> {
    pub(crate) fn new(
        producer: Arc<OperationProducer>,
        queue: Arc<OperationQueue>,
        consumer: Arc<dyn Consumer<T>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            producer,
            queue,
            state: ReentrantMutex::new(RefCell::new(BridgeState {
                consumer: Some(consumer),
                active_call: None,
                phase: Phase::Idle,
            })),
        })
    }

    /// Cancel the attachment.
    ///
    /// Clears the consumer reference synchronously and cancels the
    /// outstanding call. Nothing is delivered afterwards, even if a result
    /// is already in flight. Idempotent; never produces a terminal event.
    pub(crate) fn cancel(&self) {
        let guard = self.state.lock();
        let call = {
            let mut state = guard.borrow_mut();
            state.consumer = None;
            state.phase = Phase::Terminal;
            state.active_call.take()
        };
        if let Some(call) = call {
            call.cancel();
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        let guard = self.state.lock();
        let terminal = guard.borrow().phase == Phase::Terminal;
        terminal
    }

    /// Send the terminal event and retire the bridge.
    ///
    /// The consumer reference is cleared before notifying, so nothing can
    /// be delivered after the terminal event. The outstanding call is
    /// cancelled so a failed subscription does not keep its socket
    /// registration alive.
    fn finish(
        &self,
        state: &RefCell<BridgeState<T>>,
        consumer: Arc<dyn Consumer<T>>,
        outcome: Result<(), GqlError>,
    ) {
        let call = {
            let mut state = state.borrow_mut();
            state.consumer = None;
            state.phase = Phase::Terminal;
            state.active_call.take()
        };
        if let Some(call) = call {
            call.cancel();
        }
        consumer.on_completion(outcome);
    }
}

impl<T: DeserializeOwned + Send + 'static> OperationBridge<T> {
    /// Consumer-side demand signal.
    ///
    /// Demand is presence-only: any nonzero demand arms exactly one call
    /// submission, since network operations cannot be produced
    /// incrementally. Zero demand and demand on a terminal bridge are
    /// no-ops. If the client's submission queue has already shut down the
    /// attachment fails with a cancelled-transport error.
    pub(crate) fn request(self: &Arc<Self>, demand: usize) {
        if demand == 0 {
            return;
        }

        let guard = self.state.lock();
        {
            let mut state = guard.borrow_mut();
            if state.phase == Phase::Terminal || state.consumer.is_none() {
                return;
            }
            state.phase = Phase::Requested;
        }

        let bridge = Arc::clone(self);
        if !self.queue.submit(move || bridge.issue_call()) {
            let consumer = guard.borrow().consumer.clone();
            if let Some(consumer) = consumer {
                self.finish(
                    &guard,
                    consumer,
                    Err(GqlError::Transport(TransportError::Cancelled)),
                );
            }
        }
    }

    /// Runs on the operation queue: supersede any outstanding call and
    /// invoke the producer.
    fn issue_call(self: &Arc<Self>) {
        let guard = self.state.lock();

        let prior = {
            let mut state = guard.borrow_mut();
            if state.phase == Phase::Terminal || state.consumer.is_none() {
                return;
            }
            state.active_call.take()
        };
        if let Some(prior) = prior {
            prior.cancel();
        }

        let weak = Arc::downgrade(self);
        let on_result: OnResult = Box::new(move |result| {
            if let Some(bridge) = weak.upgrade() {
                bridge.handle_result(result);
            }
        });
        let handle = self.producer.invoke(on_result);

        let mut state = guard.borrow_mut();
        if state.phase == Phase::Terminal {
            // The call finished (or the consumer cancelled) synchronously
            // during invoke; the returned handle has nothing left to do.
            handle.cancel();
        } else {
            state.active_call = Some(handle);
            state.phase = Phase::AwaitingResult;
        }
    }

    /// Interpret one result envelope from the transport.
    fn handle_result(&self, result: Result<OperationOutcome, TransportError>) {
        let guard = self.state.lock();

        // A cancelled bridge silently discards anything still in flight.
        let Some(consumer) = guard.borrow().consumer.clone() else {
            return;
        };

        match result {
            Ok(outcome) => {
                if !outcome.errors.is_empty() {
                    self.finish(&guard, consumer, Err(GqlError::Errors(outcome.errors)));
                } else if let Some(data) = outcome.data {
                    match serde_json::from_value::<T>(data) {
                        Ok(value) => {
                            // No state borrow is held here; the consumer may
                            // re-enter request() or cancel() on this stack.
                            consumer.on_value(value);

                            let done = match self.producer.policy {
                                CompletionPolicy::Finite => true,
                                CompletionPolicy::ServerConfirmed => {
                                    outcome.source == ResultSource::Server
                                }
                                CompletionPolicy::Unbounded => false,
                            };
                            if done {
                                // Re-read: the consumer may have cancelled
                                // from within on_value.
                                let consumer = guard.borrow().consumer.clone();
                                if let Some(consumer) = consumer {
                                    self.finish(&guard, consumer, Ok(()));
                                }
                            }
                        }
                        Err(err) => {
                            self.finish(&guard, consumer, Err(GqlError::Transport(err.into())));
                        }
                    }
                } else {
                    self.finish(&guard, consumer, Err(GqlError::MissingData));
                }
            }
            Err(cause) => {
                self.finish(&guard, consumer, Err(GqlError::Transport(cause)));
            }
        }
    }
}
