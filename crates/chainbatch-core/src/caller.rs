//! The `CanisterCaller` trait — performs one remote canister call.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CallError;
use crate::model::CallRequest;

/// Performs a single remote call on behalf of `sender`.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn CanisterCaller>`.
#[async_trait]
pub trait CanisterCaller: Send + Sync + 'static {
    /// Execute `request` and return its opaque result.
    async fn call(&self, sender: &str, request: &CallRequest) -> Result<Value, CallError>;

    /// Query the state of a previously submitted call.
    ///
    /// `Ok(None)` means the call has not completed yet. Callers that only
    /// support synchronous completion keep the default.
    async fn poll(&self, _sender: &str, _request_id: &str) -> Result<Option<Value>, CallError> {
        Err(CallError::Unsupported("poll"))
    }

    /// Identifier used in logs (URL or name).
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: CanisterCaller + ?Sized> CanisterCaller for Arc<T> {
    async fn call(&self, sender: &str, request: &CallRequest) -> Result<Value, CallError> {
        (**self).call(sender, request).await
    }

    async fn poll(&self, sender: &str, request_id: &str) -> Result<Option<Value>, CallError> {
        (**self).poll(sender, request_id).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Adapts an async closure into a [`CanisterCaller`].
///
/// ```rust
/// use chainbatch_core::{CallError, FnCaller};
/// use serde_json::json;
///
/// let caller = FnCaller::new("echo", |_sender, req| async move {
///     if req.method == "fail" {
///         Err(CallError::Other("no".into()))
///     } else {
///         Ok(json!(req.arg))
///     }
/// });
/// ```
pub struct FnCaller<F> {
    name: String,
    f: F,
}

impl<F> FnCaller<F> {
    pub fn new<Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(String, CallRequest) -> Fut,
        Fut: Future<Output = Result<Value, CallError>>,
    {
        Self { name: name.into(), f }
    }
}

#[async_trait]
impl<F, Fut> CanisterCaller for FnCaller<F>
where
    F: Fn(String, CallRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, CallError>> + Send + 'static,
{
    async fn call(&self, sender: &str, request: &CallRequest) -> Result<Value, CallError> {
        (self.f)(sender.to_string(), request.clone()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
