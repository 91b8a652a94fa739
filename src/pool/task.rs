//! CPU task representation.

use std::time::Instant;

use crate::dispatch::request::RequestId;
use crate::dispatch::DispatchResult;

/// A unit of CPU-bound work queued for a worker slot.
///
/// Carries a back-reference to its originating request; the result is handed
/// back to the dispatcher through the completion registry under that ID.
pub struct CpuTask {
    pub id: RequestId,
    pub submitted_at: Instant,
    work: Box<dyn FnOnce() -> DispatchResult + Send + 'static>,
}

impl CpuTask {
    pub fn new<F>(id: RequestId, work: F) -> Self
    where
        F: FnOnce() -> DispatchResult + Send + 'static,
    {
        Self {
            id,
            submitted_at: Instant::now(),
            work: Box::new(work),
        }
    }

    /// Execute the task to its terminal result. Consumes the task.
    pub fn run(self) -> DispatchResult {
        (self.work)()
    }
}

impl std::fmt::Debug for CpuTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuTask")
            .field("id", &self.id)
            .field("submitted_at", &self.submitted_at)
            .finish_non_exhaustive()
    }
}
