//! Startup and shutdown lifecycle.

pub mod shutdown;

pub use shutdown::Shutdown;
