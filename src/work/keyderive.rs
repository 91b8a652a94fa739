//! Key-stretching primitive used as the CPU-bound workload.
//!
//! Deterministic iterated SHA-512 over password and salt. Opaque to the
//! dispatcher: it only sees "submit work, receive exactly one completion".

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

/// Hard cap on iterations so a single request cannot pin a worker slot
/// for minutes.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// SHA-512 digest width; derived keys cannot be longer.
pub const MAX_KEY_BYTES: usize = 64;

/// Parameters for one key derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyDeriveParams {
    pub password: String,
    pub salt: String,
    pub iterations: u32,
    /// Derived key length in bytes.
    pub length: usize,
}

impl Default for KeyDeriveParams {
    fn default() -> Self {
        Self {
            password: "a".to_string(),
            salt: "b".to_string(),
            iterations: 100_000,
            length: MAX_KEY_BYTES,
        }
    }
}

impl KeyDeriveParams {
    /// Structural validation, performed before the task is admitted.
    pub fn validate(&self) -> Result<(), String> {
        if self.iterations == 0 {
            return Err("iterations must be at least 1".to_string());
        }
        if self.iterations > MAX_ITERATIONS {
            return Err(format!("iterations must be at most {}", MAX_ITERATIONS));
        }
        if self.length == 0 || self.length > MAX_KEY_BYTES {
            return Err(format!("length must be between 1 and {}", MAX_KEY_BYTES));
        }
        Ok(())
    }
}

/// Derive a key, returning it hex-encoded.
///
/// Pure and deterministic for identical parameters. Runs for a duration
/// proportional to `iterations`; callers must not run this on the dispatch
/// path.
pub fn derive(params: &KeyDeriveParams) -> Result<String, String> {
    params.validate()?;

    let mut hasher = Sha512::new();
    hasher.update(params.salt.as_bytes());
    hasher.update(params.password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..params.iterations {
        digest = Sha512::digest(&digest);
    }

    let hex = format!("{:x}", digest);
    Ok(hex[..params.length * 2].to_string())
}
