//! CPU worker pool subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher::submit (cpu-bound)
//!     → WorkerPool::enqueue (bounded FIFO queue, Overloaded when full)
//!     → worker slot (one OS thread per slot, at most `size` running)
//!     → CompletionRegistry::complete (exactly-once, back to the caller)
//! ```

pub mod cpu_pool;
pub mod task;

pub use cpu_pool::WorkerPool;
pub use task::CpuTask;
