//! Configuration validation.
//!
//! Structural checks run after parsing and before any subsystem starts.
//! All problems are accumulated so the operator sees every mistake at once.

use std::net::SocketAddr;

use crate::config::schema::DispatchConfig;

/// A single validation failure, pointing at the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the full configuration, accumulating every failure.
pub fn validate_config(config: &DispatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address".to_string(),
            message: format!("not a valid socket address: {}", config.listener.bind_address),
        });
    }

    if config.pool.workers == Some(0) {
        errors.push(ValidationError {
            field: "pool.workers".to_string(),
            message: "must be at least 1 when set".to_string(),
        });
    }

    if config.pool.queue_depth == 0 {
        errors.push(ValidationError {
            field: "pool.queue_depth".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError {
            field: "timeouts.request_secs".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    if config.timeouts.io_op_ms == Some(0) {
        errors.push(ValidationError {
            field: "timeouts.io_op_ms".to_string(),
            message: "must be at least 1 when set".to_string(),
        });
    }

    if config.transport.data_dir.is_empty() {
        errors.push(ValidationError {
            field: "transport.data_dir".to_string(),
            message: "must not be empty".to_string(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address".to_string(),
            message: format!(
                "not a valid socket address: {}",
                config.observability.metrics_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
