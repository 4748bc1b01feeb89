//! `BatchCallService` — entry point used by the wallet transport layer.
//!
//! Ways in:
//! - [`BatchCallService::run`] for typed callers
//! - [`BatchCallService::handle`] for parsed `icrc112_batch_call_canister`
//!   JSON-RPC requests
//! - [`BatchCallService::handle_str`] for raw request bodies

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::caller::CanisterCaller;
use crate::config::ServiceConfig;
use crate::error::BatchError;
use crate::executor::BatchExecutor;
use crate::model::{BatchCallParams, BatchCallResponse, RequestSequence};
use crate::request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};

/// JSON-RPC method name served by [`BatchCallService::handle`].
pub const BATCH_CALL_METHOD: &str = "icrc112_batch_call_canister";

/// Validates request sequences and runs them through a fresh
/// [`BatchExecutor`] per invocation.
#[derive(Clone)]
pub struct BatchCallService {
    caller: Arc<dyn CanisterCaller>,
    config: ServiceConfig,
}

impl BatchCallService {
    pub fn new(caller: Arc<dyn CanisterCaller>, config: ServiceConfig) -> Self {
        Self { caller, config }
    }

    /// Create without structural limits.
    pub fn with_caller(caller: Arc<dyn CanisterCaller>) -> Self {
        Self::new(caller, ServiceConfig::default())
    }

    /// Execute `requests` on behalf of `sender`.
    ///
    /// Fails only for structurally invalid input, before any call is made.
    /// Call-level failures are reported inside the returned responses.
    pub async fn run(
        &self,
        requests: &RequestSequence,
        sender: &str,
    ) -> Result<BatchCallResponse, BatchError> {
        self.validate(requests)?;

        info!(
            sender,
            batches = requests.len(),
            requests = requests.iter().map(Vec::len).sum::<usize>(),
            "executing batch call"
        );

        let responses = BatchExecutor::new(self.caller.as_ref(), sender)
            .execute(requests)
            .await;
        Ok(BatchCallResponse { responses })
    }

    /// Serve one raw JSON-RPC request body.
    ///
    /// Unparseable input is answered with `-32700`, a body that is not a
    /// JSON-RPC request with `-32600`. The id is echoed when it can be read.
    pub async fn handle_str(&self, input: &str) -> JsonRpcResponse {
        let raw: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "unparseable JSON-RPC request");
                return JsonRpcResponse::failure(
                    RpcId::Null,
                    JsonRpcError::new(JsonRpcError::PARSE_ERROR, format!("parse error: {e}")),
                );
            }
        };

        let id = raw
            .get("id")
            .and_then(|id| serde_json::from_value::<RpcId>(id.clone()).ok())
            .unwrap_or_default();
        match serde_json::from_value::<JsonRpcRequest>(raw) {
            Ok(req) => self.handle(req).await,
            Err(e) => JsonRpcResponse::failure(
                id,
                JsonRpcError::new(JsonRpcError::INVALID_REQUEST, format!("invalid request: {e}")),
            ),
        }
    }

    /// Serve one JSON-RPC request.
    pub async fn handle(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        if req.jsonrpc != "2.0" {
            return JsonRpcResponse::failure(
                req.id,
                JsonRpcError::new(
                    JsonRpcError::INVALID_REQUEST,
                    format!("unsupported jsonrpc version: {}", req.jsonrpc),
                ),
            );
        }
        if req.method != BATCH_CALL_METHOD {
            return JsonRpcResponse::failure(
                req.id,
                JsonRpcError::new(
                    JsonRpcError::METHOD_NOT_FOUND,
                    format!("method not found: {}", req.method),
                ),
            );
        }

        let params: BatchCallParams = match serde_json::from_value(req.params) {
            Ok(p) => p,
            Err(e) => {
                let err = BatchError::InvalidParams(e.to_string());
                warn!(id = %req.id, error = %err, "rejecting batch call");
                return JsonRpcResponse::failure(req.id, invalid_params(&err));
            }
        };

        match self.run(&params.requests, &params.sender).await {
            Ok(envelope) => match serde_json::to_value(&envelope) {
                Ok(result) => JsonRpcResponse::success(req.id, result),
                Err(e) => JsonRpcResponse::failure(
                    req.id,
                    JsonRpcError::new(JsonRpcError::INTERNAL_ERROR, format!("failed to encode responses: {e}")),
                ),
            },
            Err(err) => {
                warn!(id = %req.id, error = %err, "rejecting batch call");
                JsonRpcResponse::failure(req.id, invalid_params(&err))
            }
        }
    }

    fn validate(&self, requests: &RequestSequence) -> Result<(), BatchError> {
        if requests.is_empty() {
            return Err(BatchError::EmptySequence);
        }
        if let Some(max) = self.config.max_batches {
            if requests.len() > max {
                return Err(BatchError::TooManyBatches { count: requests.len(), max });
            }
        }
        for (batch, reqs) in requests.iter().enumerate() {
            if reqs.is_empty() {
                return Err(BatchError::EmptyBatch { batch });
            }
            if let Some(max) = self.config.max_batch_size {
                if reqs.len() > max {
                    return Err(BatchError::BatchTooLarge { batch, len: reqs.len(), max });
                }
            }
        }
        Ok(())
    }
}

fn invalid_params(err: &BatchError) -> JsonRpcError {
    JsonRpcError::new(JsonRpcError::INVALID_PARAMS, err.to_string())
}
