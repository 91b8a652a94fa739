//! Error definitions for the dispatch path.

use thiserror::Error;

/// Errors that terminate a dispatched request.
///
/// Every variant is delivered through the request's continuation exactly
/// once; none of them bring down the dispatcher or the worker pool.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The worker pool queue is at its configured bound. The caller should
    /// retry later.
    #[error("worker pool saturated, queue bound reached")]
    Overloaded,

    /// A CPU task failed internally. Isolated to the originating request.
    #[error("cpu task fault: {0}")]
    TaskFault(String),

    /// An I/O operation did not complete within the configured timeout.
    #[error("operation timed out after {0} ms")]
    Timeout(u64),

    /// The underlying transport (network fetch, file read) reported failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request was malformed and never admitted.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl DispatchError {
    /// Short stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Overloaded => "overloaded",
            DispatchError::TaskFault(_) => "task_fault",
            DispatchError::Timeout(_) => "timeout",
            DispatchError::Transport(_) => "transport",
            DispatchError::InvalidRequest(_) => "invalid_request",
        }
    }
}
