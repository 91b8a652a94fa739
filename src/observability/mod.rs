//! Observability subsystem.
//!
//! Structured logging uses the `tracing` ecosystem, initialized in `main`
//! with an `EnvFilter`. Metrics are exported in Prometheus format when
//! enabled in configuration.

pub mod metrics;
