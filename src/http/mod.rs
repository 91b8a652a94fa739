//! Inbound HTTP surface.

pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
