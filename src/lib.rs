//! Bounded-concurrency request dispatch library.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pool;
pub mod transport;
pub mod work;

pub use config::DispatchConfig;
pub use dispatch::Dispatcher;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
