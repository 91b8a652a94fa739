//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML config files;
//! every section falls back to usable defaults.

use serde::{Deserialize, Serialize};

/// Root configuration for the dispatch server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// CPU worker pool sizing and queue bound.
    pub pool: PoolConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// I/O primitive settings.
    pub transport: TransportConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4000".to_string(),
        }
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Worker slot count. Defaults to the detected CPU core count.
    pub workers: Option<usize>,

    /// Maximum tasks waiting beyond the slots; admissions past this bound
    /// are rejected with `Overloaded`.
    pub queue_depth: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: None,
            queue_depth: 64,
        }
    }
}

impl PoolConfig {
    /// Effective worker count, detected once at startup when unset.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout enforced at the HTTP layer.
    pub request_secs: u64,

    /// Per-operation timeout for pending I/O. `None` leaves operations
    /// pending indefinitely.
    pub io_op_ms: Option<u64>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            io_op_ms: Some(10_000),
        }
    }
}

/// I/O primitive configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Directory file-read operations are confined to.
    pub data_dir: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address for the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_from_empty_toml() {
        let config: DispatchConfig = toml::from_str("").expect("empty config parses");
        assert_eq!(config.listener.bind_address, "0.0.0.0:4000");
        assert_eq!(config.pool.queue_depth, 64);
        assert!(config.pool.worker_count() >= 1);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: DispatchConfig = toml::from_str(
            r#"
            [pool]
            workers = 2
            queue_depth = 5
            "#,
        )
        .expect("partial config parses");
        assert_eq!(config.pool.worker_count(), 2);
        assert_eq!(config.pool.queue_depth, 5);
        assert_eq!(config.timeouts.request_secs, 30);
    }
}
