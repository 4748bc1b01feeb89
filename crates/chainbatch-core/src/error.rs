//! Caller-level and structural error types.

use thiserror::Error;

/// Errors a [`CanisterCaller`](crate::caller::CanisterCaller) may return for a
/// single call.
///
/// The executor never propagates these; it turns each one into a
/// `Failure(1000)` response item carrying the `Display` text verbatim.
#[derive(Debug, Error)]
pub enum CallError {
    /// Transport failure (connection refused, HTTP status, etc.).
    #[error("{0}")]
    Transport(String),

    /// The canister or gateway rejected the call.
    #[error("{message}")]
    Rejected { code: i64, message: String },

    /// The call did not settle within the caller's deadline.
    #[error("Call timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The caller does not implement this capability.
    #[error("{0} is not supported by this caller")]
    Unsupported(&'static str),

    /// The reply could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl CallError {
    /// Returns `true` if the remote side answered with an explicit rejection.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Structural problems with a request sequence, detected before any call is
/// made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("request sequence is empty")]
    EmptySequence,

    #[error("batch {batch} is empty")]
    EmptyBatch { batch: usize },

    #[error("request sequence has {count} batches (max {max})")]
    TooManyBatches { count: usize, max: usize },

    #[error("batch {batch} has {len} requests (max {max})")]
    BatchTooLarge { batch: usize, len: usize, max: usize },

    #[error("invalid params: {0}")]
    InvalidParams(String),
}
