//! Fixed-size CPU worker pool with a bounded FIFO queue.
//!
//! # Responsibilities
//! - Execute CPU tasks on dedicated OS threads, never on the dispatch path
//! - Enforce the slot invariant: at most `size` tasks run concurrently
//! - Preserve FIFO fairness for tasks queued beyond the slot count
//! - Reject admissions beyond the queue bound with `Overloaded`
//! - Isolate task faults: a panicking task frees its slot and reports
//!   `TaskFault`; siblings and future tasks are unaffected

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::dispatch::error::DispatchError;
use crate::dispatch::registry::CompletionRegistry;
use crate::pool::task::CpuTask;

/// Worker pool for CPU-bound tasks.
///
/// The bounded channel is the pool's only admission resource: `try_send`
/// admits or rejects atomically, worker `recv` releases queue slots in FIFO
/// order, and thread count caps parallelism.
pub struct WorkerPool {
    tx: Option<Sender<CpuTask>>,
    workers: Vec<JoinHandle<()>>,
    size: usize,
    queue_depth: usize,
    queued: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Spawn `size` named worker threads sharing one bounded FIFO queue.
    ///
    /// Completed task results are delivered through `registry` under the
    /// task's request ID.
    pub fn new(size: usize, queue_depth: usize, registry: Arc<CompletionRegistry>) -> Self {
        let (tx, rx) = bounded::<CpuTask>(queue_depth);
        let queued = Arc::new(AtomicUsize::new(0));
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut workers = Vec::with_capacity(size);
        for slot in 0..size {
            let rx = rx.clone();
            let registry = Arc::clone(&registry);
            let queued = Arc::clone(&queued);
            let in_flight = Arc::clone(&in_flight);

            let handle = thread::Builder::new()
                .name(format!("cpu-worker-{}", slot))
                .spawn(move || worker_loop(slot, rx, registry, queued, in_flight))
                .expect("failed to spawn cpu worker thread");
            workers.push(handle);
        }

        tracing::info!(workers = size, queue_depth, "Worker pool started");

        Self {
            tx: Some(tx),
            workers,
            size,
            queue_depth,
            queued,
            in_flight,
        }
    }

    /// Admit a task, returning immediately.
    ///
    /// Fails with `Overloaded` when the queue is at its bound. Order of
    /// admitted tasks is preserved end to end.
    pub fn enqueue(&self, task: CpuTask) -> Result<(), DispatchError> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| DispatchError::TaskFault("worker pool shut down".to_string()))?;

        match tx.try_send(task) {
            Ok(()) => {
                self.queued.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Err(TrySendError::Full(task)) => {
                tracing::warn!(
                    request_id = %task.id,
                    queue_depth = self.queue_depth,
                    "Worker pool queue full, rejecting task"
                );
                Err(DispatchError::Overloaded)
            }
            Err(TrySendError::Disconnected(_)) => {
                Err(DispatchError::TaskFault("worker pool shut down".to_string()))
            }
        }
    }

    /// Number of worker slots.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Configured queue bound.
    pub fn queue_depth(&self) -> usize {
        self.queue_depth
    }

    /// Tasks admitted but not yet picked up by a worker.
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Tasks currently executing in worker slots.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Stop accepting work and join all workers.
    ///
    /// Tasks already queued are drained and completed before workers exit.
    pub fn shutdown(&mut self) {
        if self.tx.take().is_none() {
            return;
        }
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        tracing::info!("Worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(
    slot: usize,
    rx: Receiver<CpuTask>,
    registry: Arc<CompletionRegistry>,
    queued: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
) {
    tracing::debug!(slot, "Worker started");

    // recv fails only when the sender is dropped: shutdown.
    while let Ok(task) = rx.recv() {
        queued.fetch_sub(1, Ordering::SeqCst);
        in_flight.fetch_add(1, Ordering::SeqCst);

        let id = task.id;
        let waited = task.submitted_at.elapsed();

        let result = match catch_unwind(AssertUnwindSafe(|| task.run())) {
            Ok(result) => result,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "task panicked".to_string());
                tracing::error!(slot, request_id = %id, panic = %message, "CPU task panicked");
                Err(DispatchError::TaskFault(message))
            }
        };

        in_flight.fetch_sub(1, Ordering::SeqCst);

        tracing::debug!(
            slot,
            request_id = %id,
            queued_for_ms = waited.as_millis() as u64,
            ok = result.is_ok(),
            "CPU task finished"
        );

        registry.complete(id, result);
    }

    tracing::debug!(slot, "Worker exiting");
}
