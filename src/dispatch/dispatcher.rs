//! Request dispatcher.
//!
//! # Responsibilities
//! - Validate and classify every inbound request
//! - Answer fast requests on the dispatch path itself
//! - Hand CPU-bound requests to the worker pool, surfacing `Overloaded`
//!   when the bounded queue is full
//! - Issue I/O-bound operations as non-blocking calls with registered
//!   completions and an optional per-operation timeout
//! - Deliver exactly one terminal result per request, through the
//!   completion registry
//!
//! `submit` itself only performs channel sends and map inserts; everything
//! of unbounded duration runs in a worker slot or on the async runtime.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tokio::sync::oneshot;

use crate::config::DispatchConfig;
use crate::dispatch::error::DispatchError;
use crate::dispatch::registry::{CompletionRegistry, Continuation};
use crate::dispatch::request::{DispatchRequest, Operation, RequestId};
use crate::dispatch::DispatchResult;
use crate::pool::{CpuTask, WorkerPool};
use crate::transport;
use crate::work::keyderive;

/// Snapshot of dispatcher load, served by `/status`.
#[derive(Debug, Clone, Serialize)]
pub struct DispatcherStatus {
    pub pool_size: usize,
    pub queue_depth: usize,
    pub queued_tasks: usize,
    pub in_flight_tasks: usize,
    pub pending_operations: usize,
}

/// The request dispatcher. One instance per server.
pub struct Dispatcher {
    pool: WorkerPool,
    registry: Arc<CompletionRegistry>,
    client: reqwest::Client,
    data_dir: PathBuf,
    io_timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(config: &DispatchConfig) -> Self {
        let registry = Arc::new(CompletionRegistry::new());
        let pool = WorkerPool::new(
            config.pool.worker_count(),
            config.pool.queue_depth,
            Arc::clone(&registry),
        );

        Self {
            pool,
            registry,
            client: reqwest::Client::new(),
            data_dir: PathBuf::from(&config.transport.data_dir),
            io_timeout: config.timeouts.io_op_ms.map(Duration::from_millis),
        }
    }

    /// Admit a request and return the receiver its terminal result arrives on.
    ///
    /// Completes in bounded time regardless of classification. `Overloaded`
    /// and validation failures surface synchronously; everything else is
    /// delivered through the returned receiver exactly once.
    ///
    /// Must be called from within a tokio runtime (I/O operations are
    /// spawned onto it).
    pub fn submit(
        &self,
        request: DispatchRequest,
    ) -> Result<oneshot::Receiver<DispatchResult>, DispatchError> {
        let id = request.id;
        let class = request.class();
        let (tx, rx) = oneshot::channel();
        let continuation = Continuation::new(tx);

        tracing::debug!(request_id = %id, class = class.as_str(), "Dispatching request");

        match request.operation {
            Operation::Fast => {
                // Answered on the dispatch path; never enters the registry.
                continuation.complete(Ok(json!({ "message": "ok" })));
            }

            Operation::DeriveKey(params) => {
                params
                    .validate()
                    .map_err(DispatchError::InvalidRequest)?;

                self.registry.register(id, continuation);
                let task = CpuTask::new(id, move || {
                    keyderive::derive(&params)
                        .map(|key| json!({ "key": key, "iterations": params.iterations }))
                        .map_err(DispatchError::TaskFault)
                });
                if let Err(e) = self.pool.enqueue(task) {
                    // Roll back so the rejected request leaves no entry behind.
                    self.registry.cancel(id);
                    return Err(e);
                }
            }

            Operation::FetchUrl(params) => {
                params
                    .validate()
                    .map_err(DispatchError::InvalidRequest)?;

                self.registry.register(id, continuation);
                self.arm_timeout(id);

                let registry = Arc::clone(&self.registry);
                let client = self.client.clone();
                tokio::spawn(async move {
                    let result = transport::fetch::fetch(&client, &params).await;
                    registry.complete(id, result);
                });
            }

            Operation::ReadFile(params) => {
                params
                    .validate()
                    .map_err(DispatchError::InvalidRequest)?;

                self.registry.register(id, continuation);
                self.arm_timeout(id);

                let registry = Arc::clone(&self.registry);
                let path = params.resolve(&self.data_dir);
                tokio::spawn(async move {
                    let result = transport::file::read(path, &params).await;
                    registry.complete(id, result);
                });
            }
        }

        Ok(rx)
    }

    /// Mark a pending request's continuation inert.
    ///
    /// A completion arriving afterwards is a no-op; at-most-once delivery
    /// still holds. Returns false if the request was unknown or already
    /// completed.
    pub fn cancel(&self, id: RequestId) -> bool {
        let cancelled = self.registry.cancel(id);
        if cancelled {
            tracing::debug!(request_id = %id, "Request cancelled");
        }
        cancelled
    }

    /// Current load snapshot.
    pub fn status(&self) -> DispatcherStatus {
        DispatcherStatus {
            pool_size: self.pool.size(),
            queue_depth: self.pool.queue_depth(),
            queued_tasks: self.pool.queued(),
            in_flight_tasks: self.pool.in_flight(),
            pending_operations: self.registry.pending_count(),
        }
    }

    fn arm_timeout(&self, id: RequestId) {
        if let Some(timeout) = self.io_timeout {
            self.registry.arm_timeout(id, timeout);
        }
    }
}
