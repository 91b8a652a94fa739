//! Configuration subsystem: schema, loading, validation.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    DispatchConfig, ListenerConfig, ObservabilityConfig, PoolConfig, TimeoutConfig,
    TransportConfig,
};
