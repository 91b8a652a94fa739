//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → Dispatcher::submit (classify: fast / cpu-bound / io-bound)
//!         fast     → completed on the dispatch path
//!         cpu      → WorkerPool (bounded FIFO queue, parallel slots)
//!         io       → non-blocking transport call + timeout race
//!     → CompletionRegistry (exactly one terminal delivery per request)
//!     → caller's oneshot receiver
//! ```
//!
//! The dispatch path itself never blocks: `submit` does validation, channel
//! sends, and map inserts, all bounded-time.

pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod request;

pub use dispatcher::{Dispatcher, DispatcherStatus};
pub use error::DispatchError;
pub use registry::{CompletionRegistry, Continuation};
pub use request::{DispatchRequest, Operation, RequestClass, RequestId};

/// Terminal outcome of a dispatched request.
pub type DispatchResult = Result<serde_json::Value, DispatchError>;
