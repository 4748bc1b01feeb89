//! HTTP JSON-RPC canister caller backed by `reqwest`.
//!
//! Every call is one JSON-RPC 2.0 POST to a signing gateway:
//!
//! ```text
//! { "jsonrpc": "2.0", "id": 7, "method": "canister_call",
//!   "params": { "sender", "canisterId", "method", "arg", "nonce"? } }
//! ```
//!
//! The gateway answers with the call's opaque result or a JSON-RPC error,
//! which becomes [`CallError::Rejected`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use chainbatch_core::caller::CanisterCaller;
use chainbatch_core::error::CallError;
use chainbatch_core::model::CallRequest;
use chainbatch_core::request::{JsonRpcRequest, JsonRpcResponse};

/// Gateway method that performs one canister call.
pub const CALL_METHOD: &str = "canister_call";
/// Gateway method that reports on a previously submitted call.
pub const POLL_METHOD: &str = "canister_poll";

/// Configuration for `HttpCanisterCaller`.
#[derive(Debug, Clone)]
pub struct HttpCallerConfig {
    /// Deadline for a single gateway round trip.
    pub request_timeout: Duration,
}

impl Default for HttpCallerConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Canister caller that forwards each call to a JSON-RPC gateway over HTTP.
pub struct HttpCanisterCaller {
    url: String,
    http: reqwest::Client,
    request_timeout: Duration,
    next_id: AtomicU64,
}

impl HttpCanisterCaller {
    /// Create a caller for the given gateway URL.
    pub fn new(url: impl Into<String>, config: HttpCallerConfig) -> Result<Self, CallError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CallError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            http,
            request_timeout: config.request_timeout,
            next_id: AtomicU64::new(1),
        })
    }

    /// Create with default configuration.
    pub fn default_for(url: impl Into<String>) -> Result<Self, CallError> {
        Self::new(url, HttpCallerConfig::default())
    }

    async fn send_once(&self, method: &str, params: Value) -> Result<Value, CallError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let req = JsonRpcRequest::new(id, method, params);

        let resp = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| self.map_reqwest(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CallError::Transport(format!("HTTP {status}: {body}")));
        }

        let body = resp.text().await.map_err(|e| self.map_reqwest(e))?;
        let reply = serde_json::from_str::<JsonRpcResponse>(&body)?;
        into_call_result(reply)
    }

    fn map_reqwest(&self, e: reqwest::Error) -> CallError {
        if e.is_timeout() {
            CallError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            CallError::Transport(e.to_string())
        }
    }
}

/// Named params for one `canister_call`.
fn call_params(sender: &str, request: &CallRequest) -> Value {
    let mut params = json!({
        "sender": sender,
        "canisterId": request.canister_id,
        "method": request.method,
        "arg": request.arg,
    });
    if let Some(nonce) = &request.nonce {
        params["nonce"] = Value::String(nonce.clone());
    }
    params
}

fn into_call_result(resp: JsonRpcResponse) -> Result<Value, CallError> {
    resp.into_result().map_err(|e| CallError::Rejected {
        code: e.code,
        message: e.message,
    })
}

#[async_trait]
impl CanisterCaller for HttpCanisterCaller {
    async fn call(&self, sender: &str, request: &CallRequest) -> Result<Value, CallError> {
        tracing::debug!(
            url = %self.url,
            canister = %request.canister_id,
            method = %request.method,
            "sending canister call"
        );
        self.send_once(CALL_METHOD, call_params(sender, request)).await
    }

    async fn poll(&self, sender: &str, request_id: &str) -> Result<Option<Value>, CallError> {
        let result = self
            .send_once(POLL_METHOD, json!({ "sender": sender, "requestId": request_id }))
            .await?;
        Ok(match result {
            Value::Null => None,
            v => Some(v),
        })
    }

    fn name(&self) -> &str {
        &self.url
    }
}
