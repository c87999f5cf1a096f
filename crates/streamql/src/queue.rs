//! Dedicated submission thread for network operations.
//!
//! Every network call a client issues is funneled through one
//! `OperationQueue`: a single background thread draining a task queue in
//! order. Submissions are serialized relative to each other while callers
//! never block; result delivery still happens on whatever thread the
//! transport chooses.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use parking_lot::Mutex;

/// Default capacity for the submission queue.
const DEFAULT_QUEUE_CAPACITY: usize = 256;

type Task = Box<dyn FnOnce() + Send>;

enum QueueMessage {
    Run(Task),
    Shutdown,
}

/// A dedicated worker thread that executes operation submissions in order.
pub(crate) struct OperationQueue {
    sender: Sender<QueueMessage>,
    running: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl OperationQueue {
    /// Spawn the queue thread with the given name.
    pub(crate) fn new(name: impl Into<String>) -> Self {
        let (sender, receiver) = bounded(DEFAULT_QUEUE_CAPACITY);
        let running = Arc::new(AtomicBool::new(true));

        let thread_running = running.clone();
        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                queue_loop(receiver);
                thread_running.store(false, Ordering::Release);
            })
            .expect("failed to spawn operation queue thread");

        Self {
            sender,
            running,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Submit a task for sequential execution.
    ///
    /// Returns `false` if the queue has been stopped or is full; the task
    /// is dropped in that case.
    pub(crate) fn submit(&self, task: impl FnOnce() + Send + 'static) -> bool {
        if !self.running.load(Ordering::Acquire) {
            return false;
        }

        match self.sender.try_send(QueueMessage::Run(Box::new(task))) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Request shutdown. Already-submitted tasks still run; new
    /// submissions are rejected immediately.
    pub(crate) fn stop(&self) {
        self.running.store(false, Ordering::Release);
        let _ = self.sender.try_send(QueueMessage::Shutdown);
    }

    /// Wait for the queue thread to finish. Call `stop()` first.
    pub(crate) fn join(&self) {
        if let Some(handle) = self.handle.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for OperationQueue {
    fn drop(&mut self) {
        // Non-blocking: the thread drains and exits on its own.
        self.stop();
    }
}

fn queue_loop(receiver: Receiver<QueueMessage>) {
    while let Ok(message) = receiver.recv() {
        match message {
            QueueMessage::Run(task) => task(),
            QueueMessage::Shutdown => {
                // Drain work that was accepted before the stop request.
                while let Ok(QueueMessage::Run(task)) = receiver.try_recv() {
                    task();
                }
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_tasks_run_in_submission_order() {
        let queue = OperationQueue::new("test-queue");
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..10 {
            let order = order.clone();
            queue.submit(move || order.lock().push(i));
        }

        queue.stop();
        queue.join();
        assert_eq!(*order.lock(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_submit_after_stop_is_rejected() {
        let queue = OperationQueue::new("test-queue");
        queue.stop();
        assert!(!queue.submit(|| {}));
        queue.join();
    }

    #[test]
    fn test_stop_drains_pending_tasks() {
        let queue = OperationQueue::new("test-queue");
        let ran = Arc::new(AtomicBool::new(false));

        let ran_clone = ran.clone();
        queue.submit(move || {
            thread::sleep(Duration::from_millis(20));
            ran_clone.store(true, Ordering::SeqCst);
        });

        queue.stop();
        queue.join();
        assert!(ran.load(Ordering::SeqCst));
    }
}
