//! Shared test support: a scriptable transport and a recording consumer.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::Value;

use streamql::{
    CachePolicy, CancelHandle, Consumer, GqlError, GraphQLRequest, GraphQLTransport, OnResult,
    OperationOutcome, TransportError,
};

type SharedCallback = Arc<dyn Fn(Result<OperationOutcome, TransportError>) + Send + Sync>;

/// Which transport primitive an operation arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Fetch,
    Perform,
    Subscribe,
}

struct PendingOperation {
    kind: OpKind,
    cache_policy: Option<CachePolicy>,
    context_id: Option<String>,
    callback: SharedCallback,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
struct MockState {
    operations: Vec<PendingOperation>,
    resume_calls: Vec<bool>,
    pause_calls: u32,
    payload_updates: Vec<(Value, bool)>,
}

/// A transport whose operations are delivered by the test script.
///
/// Each primitive records its callback and returns a handle that flags
/// cancellation; tests then push envelopes through `deliver`.
#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(
        &self,
        kind: OpKind,
        cache_policy: Option<CachePolicy>,
        context_id: Option<String>,
        on_result: OnResult,
    ) -> CancelHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let handle = CancelHandle::new(move || flag.store(true, Ordering::SeqCst));

        self.state.lock().operations.push(PendingOperation {
            kind,
            cache_policy,
            context_id,
            callback: Arc::from(on_result),
            cancelled,
        });
        handle
    }

    /// Deliver one envelope for the operation at `index`, outside any
    /// transport lock, the way a network thread would.
    pub fn deliver(&self, index: usize, result: Result<OperationOutcome, TransportError>) {
        let callback = self.state.lock().operations[index].callback.clone();
        callback(result);
    }

    /// Spin until `count` operations have been issued.
    pub fn wait_for_operations(&self, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while self.operation_count() < count {
            assert!(
                Instant::now() < deadline,
                "timed out waiting for {count} operations"
            );
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn operation_count(&self) -> usize {
        self.state.lock().operations.len()
    }

    pub fn operation_kind(&self, index: usize) -> OpKind {
        self.state.lock().operations[index].kind
    }

    pub fn operation_cache_policy(&self, index: usize) -> Option<CachePolicy> {
        self.state.lock().operations[index].cache_policy
    }

    pub fn operation_context_id(&self, index: usize) -> Option<String> {
        self.state.lock().operations[index].context_id.clone()
    }

    pub fn was_cancelled(&self, index: usize) -> bool {
        self.state.lock().operations[index]
            .cancelled
            .load(Ordering::SeqCst)
    }

    pub fn resume_count(&self) -> usize {
        self.state.lock().resume_calls.len()
    }

    pub fn pause_count(&self) -> u32 {
        self.state.lock().pause_calls
    }

    pub fn payload_updates(&self) -> Vec<(Value, bool)> {
        self.state.lock().payload_updates.clone()
    }
}

impl GraphQLTransport for MockTransport {
    fn fetch(
        &self,
        _request: GraphQLRequest,
        cache_policy: CachePolicy,
        context_id: Option<String>,
        on_result: OnResult,
    ) -> CancelHandle {
        self.record(OpKind::Fetch, Some(cache_policy), context_id, on_result)
    }

    fn perform(&self, _request: GraphQLRequest, on_result: OnResult) -> CancelHandle {
        self.record(OpKind::Perform, None, None, on_result)
    }

    fn open_subscription(&self, _request: GraphQLRequest, on_result: OnResult) -> CancelHandle {
        self.record(OpKind::Subscribe, None, None, on_result)
    }

    fn resume_connection(&self, auto_reconnect: bool) {
        self.state.lock().resume_calls.push(auto_reconnect);
    }

    fn pause_connection(&self) {
        self.state.lock().pause_calls += 1;
    }

    fn update_connecting_payload(&self, payload: Value, reconnect_if_connected: bool) {
        self.state
            .lock()
            .payload_updates
            .push((payload, reconnect_if_connected));
    }
}

/// One notification observed by a [`RecordingConsumer`].
#[derive(Debug, Clone)]
pub enum Event {
    Value(Value),
    Completed,
    Failed(GqlError),
}

/// Consumer that records everything it receives.
#[derive(Default)]
pub struct RecordingConsumer {
    events: Mutex<Vec<Event>>,
}

impl RecordingConsumer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }
}

impl Consumer<Value> for RecordingConsumer {
    fn on_value(&self, value: Value) {
        self.events.lock().push(Event::Value(value));
    }

    fn on_completion(&self, result: Result<(), GqlError>) {
        self.events.lock().push(match result {
            Ok(()) => Event::Completed,
            Err(err) => Event::Failed(err),
        });
    }
}
