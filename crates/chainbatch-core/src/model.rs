//! Batch call request/response model and its JSON wire form.
//!
//! ```text
//! Request       { canisterId, method, arg, nonce? }
//! ResponseItem  { result } | { error: { code, message, data? } }
//! Sequence      [[item, ...], [item, ...], ...]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message carried by every item that was skipped because an earlier batch
/// failed.
pub const SKIPPED_MESSAGE: &str = "Not processed due to batch request failure";

/// One remote canister call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    /// Target canister (textual principal).
    pub canister_id: String,
    pub method: String,
    /// Encoded argument payload; opaque to the engine.
    pub arg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl CallRequest {
    pub fn new(
        canister_id: impl Into<String>,
        method: impl Into<String>,
        arg: impl Into<String>,
    ) -> Self {
        Self {
            canister_id: canister_id.into(),
            method: method.into(),
            arg: arg.into(),
            nonce: None,
        }
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }
}

/// Requests executed concurrently. Output order matches this order.
pub type ParallelBatch = Vec<CallRequest>;

/// Batches executed strictly in order.
pub type RequestSequence = Vec<ParallelBatch>;

/// One response slot per request, grouped exactly like the request sequence.
pub type ResponseSequence = Vec<Vec<ResponseItem>>;

/// Closed set of item-level error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum ErrorCode {
    /// The remote call itself failed.
    CallFailed,
    /// Never attempted because an earlier batch failed.
    Skipped,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        match self {
            Self::CallFailed => 1000,
            Self::Skipped => 1001,
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code.as_u16()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            1000 => Ok(Self::CallFailed),
            1001 => Ok(Self::Skipped),
            other => Err(format!("unknown batch error code {other}")),
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Error payload of a failed slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Outcome of a single request slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseItem {
    Success { result: Value },
    Failure { error: ResponseError },
}

impl ResponseItem {
    pub fn success(result: Value) -> Self {
        Self::Success { result }
    }

    pub fn call_failed(message: impl Into<String>) -> Self {
        Self::Failure {
            error: ResponseError {
                code: ErrorCode::CallFailed,
                message: message.into(),
                data: None,
            },
        }
    }

    pub fn skipped() -> Self {
        Self::Failure {
            error: ResponseError {
                code: ErrorCode::Skipped,
                message: SKIPPED_MESSAGE.into(),
                data: None,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Error code of a failed slot, `None` on success.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error.code),
        }
    }
}

/// Named params of an `icrc112_batch_call_canister` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchCallParams {
    pub sender: String,
    pub requests: RequestSequence,
}

/// Result envelope returned to the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchCallResponse {
    pub responses: ResponseSequence,
}
