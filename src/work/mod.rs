//! CPU-bound work primitives.

pub mod keyderive;

pub use keyderive::KeyDeriveParams;
