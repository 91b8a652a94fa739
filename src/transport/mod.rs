//! I/O-bound operation primitives.
//!
//! Each primitive is "submit work, receive exactly one completion": the
//! dispatcher registers a pending operation, spawns the call here, and the
//! result re-enters through the completion registry. Failures surface as
//! `DispatchError::Transport`.

pub mod fetch;
pub mod file;

pub use fetch::FetchParams;
pub use file::FileReadParams;
