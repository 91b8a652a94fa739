//! Completion registry for pending asynchronous operations.
//!
//! # Responsibilities
//! - Track every outstanding non-fast operation by request ID
//! - Deliver each registered continuation exactly once, in actual
//!   completion order
//! - Arm per-operation timeouts that race the real completion
//! - Turn cancelled requests into inert continuations (late completion
//!   becomes a no-op)
//!
//! Exactly-once delivery is structural: `DashMap::remove` atomically yields
//! ownership of the continuation, so of any concurrent completion, timeout,
//! and cancellation, only one caller ever holds it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::oneshot;

use crate::dispatch::error::DispatchError;
use crate::dispatch::request::RequestId;
use crate::dispatch::DispatchResult;

/// One-shot continuation back to the caller that submitted the request.
///
/// Consuming `complete` makes double delivery unrepresentable. If the caller
/// has gone away (receiver dropped), the send fails and the result is
/// discarded.
#[derive(Debug)]
pub struct Continuation {
    tx: oneshot::Sender<DispatchResult>,
}

impl Continuation {
    pub fn new(tx: oneshot::Sender<DispatchResult>) -> Self {
        Self { tx }
    }

    /// Deliver the terminal result. Returns false if the caller is gone.
    pub fn complete(self, result: DispatchResult) -> bool {
        self.tx.send(result).is_ok()
    }
}

struct PendingOp {
    continuation: Continuation,
    registered_at: Instant,
}

/// Table of operations that have been admitted but not yet completed.
pub struct CompletionRegistry {
    pending: DashMap<RequestId, PendingOp>,
}

impl CompletionRegistry {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
        }
    }

    /// Associate a continuation with an outstanding operation.
    pub fn register(&self, id: RequestId, continuation: Continuation) {
        self.pending.insert(
            id,
            PendingOp {
                continuation,
                registered_at: Instant::now(),
            },
        );
    }

    /// Deliver a terminal result for `id`.
    ///
    /// Returns true if this call won the entry and invoked the continuation.
    /// A second completion, a lost timeout race, or a completion after
    /// cancellation all return false without side effects.
    pub fn complete(&self, id: RequestId, result: DispatchResult) -> bool {
        match self.pending.remove(&id) {
            Some((_, op)) => {
                let waited = op.registered_at.elapsed();
                let delivered = op.continuation.complete(result);
                if !delivered {
                    tracing::debug!(
                        request_id = %id,
                        pending_for_ms = waited.as_millis() as u64,
                        "Caller gone before completion, result dropped"
                    );
                }
                true
            }
            None => false,
        }
    }

    /// Remove the entry for `id` without invoking its continuation.
    ///
    /// Any completion arriving later finds no entry and becomes a no-op.
    pub fn cancel(&self, id: RequestId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Arm a timeout for a registered operation.
    ///
    /// The timer races the real completion; whichever removes the entry
    /// first delivers, the other is a no-op.
    pub fn arm_timeout(self: &Arc<Self>, id: RequestId, timeout: Duration) {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let fired = registry.complete(
                id,
                Err(DispatchError::Timeout(timeout.as_millis() as u64)),
            );
            if fired {
                tracing::warn!(
                    request_id = %id,
                    timeout_ms = timeout.as_millis() as u64,
                    "Pending operation timed out"
                );
            }
        });
    }

    /// Number of operations currently outstanding.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Default for CompletionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registered(registry: &CompletionRegistry) -> (RequestId, oneshot::Receiver<DispatchResult>) {
        let id = RequestId::new();
        let (tx, rx) = oneshot::channel();
        registry.register(id, Continuation::new(tx));
        (id, rx)
    }

    #[tokio::test]
    async fn complete_delivers_once() {
        let registry = CompletionRegistry::new();
        let (id, rx) = registered(&registry);

        assert!(registry.complete(id, Ok(json!({"n": 1}))));
        assert!(!registry.complete(id, Ok(json!({"n": 2}))));

        let result = rx.await.expect("continuation delivered");
        assert_eq!(result.expect("success")["n"], 1);
        assert_eq!(registry.pending_count(), 0);
    }

    #[tokio::test]
    async fn cancel_makes_completion_inert() {
        let registry = CompletionRegistry::new();
        let (id, rx) = registered(&registry);

        assert!(registry.cancel(id));
        assert!(!registry.complete(id, Ok(json!({}))));

        // Continuation was dropped, never invoked.
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn concurrent_completions_deliver_exactly_once() {
        let registry = Arc::new(CompletionRegistry::new());
        let (id, rx) = registered(&registry);

        let mut handles = Vec::new();
        for n in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.complete(id, Ok(json!({ "winner": n })))
            }));
        }

        let mut wins = 0;
        for handle in handles {
            if handle.await.expect("task ran") {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
        assert!(rx.await.is_ok());
    }

    #[tokio::test]
    async fn timeout_fires_at_or_after_deadline() {
        let registry = Arc::new(CompletionRegistry::new());
        let (id, rx) = registered(&registry);
        let start = Instant::now();

        registry.arm_timeout(id, Duration::from_millis(50));

        let result = rx.await.expect("continuation delivered");
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(matches!(result, Err(DispatchError::Timeout(_))));
    }

    #[tokio::test]
    async fn completion_beats_timeout() {
        let registry = Arc::new(CompletionRegistry::new());
        let (id, rx) = registered(&registry);

        registry.arm_timeout(id, Duration::from_secs(5));
        assert!(registry.complete(id, Ok(json!({"fast": true}))));

        let result = rx.await.expect("continuation delivered");
        assert!(result.is_ok());
    }
}
