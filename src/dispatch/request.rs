//! Request identity and classification.
//!
//! # Responsibilities
//! - Generate unique request IDs for tracing and registry keys
//! - Classify each request as fast, CPU-bound, or I/O-bound
//! - Carry the arrival timestamp for latency accounting

use std::time::Instant;
use uuid::Uuid;

use crate::transport::{FetchParams, FileReadParams};
use crate::work::KeyDeriveParams;

/// Unique identifier for a dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a new unique request ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// How a request is routed by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Completes in negligible, bounded time on the dispatch path itself.
    Fast,
    /// Sustained computation; must run in a worker slot.
    CpuBound,
    /// Waits on an external system; completes asynchronously without a slot.
    IoBound,
}

impl RequestClass {
    /// Stable label for metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestClass::Fast => "fast",
            RequestClass::CpuBound => "cpu-bound",
            RequestClass::IoBound => "io-bound",
        }
    }
}

/// The work a request asks for. Classification is derived from the variant.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Immediate response, no offloading.
    Fast,
    /// Key-stretching computation, executed in a worker slot.
    DeriveKey(KeyDeriveParams),
    /// Outbound HTTP fetch.
    FetchUrl(FetchParams),
    /// Asynchronous file read from the data directory.
    ReadFile(FileReadParams),
}

impl Operation {
    pub fn class(&self) -> RequestClass {
        match self {
            Operation::Fast => RequestClass::Fast,
            Operation::DeriveKey(_) => RequestClass::CpuBound,
            Operation::FetchUrl(_) | Operation::ReadFile(_) => RequestClass::IoBound,
        }
    }
}

/// A request owned by the dispatcher from arrival until completion.
#[derive(Debug)]
pub struct DispatchRequest {
    pub id: RequestId,
    pub received_at: Instant,
    pub operation: Operation,
}

impl DispatchRequest {
    pub fn new(operation: Operation) -> Self {
        Self {
            id: RequestId::new(),
            received_at: Instant::now(),
            operation,
        }
    }

    pub fn class(&self) -> RequestClass {
        self.operation.class()
    }
}
