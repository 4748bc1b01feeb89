//! chainbatch-core — execution engine for ICRC-112 batch canister calls.
//!
//! # Overview
//!
//! A wallet receives an ordered sequence of batches. Requests inside a batch
//! run concurrently; batches run one after another, and once any call in a
//! batch fails every later batch is answered without being executed. The
//! response always has the same `[batch][index]` shape as the request.
//!
//! - [`CanisterCaller`] — the async trait that performs one remote call
//! - [`BatchExecutor`] — sequencing and settle-all concurrency
//! - [`BatchCallService`] — validation, sender binding and JSON-RPC entry point
//! - [`model`] — request/response shapes and their wire form
//! - [`CallError`] / [`BatchError`] — call-level and structural errors

pub mod caller;
pub mod config;
pub mod error;
pub mod executor;
pub mod model;
pub mod request;
pub mod service;

pub use caller::{CanisterCaller, FnCaller};
pub use config::ServiceConfig;
pub use error::{BatchError, CallError};
pub use executor::BatchExecutor;
pub use model::{
    BatchCallParams, BatchCallResponse, CallRequest, ErrorCode, ParallelBatch, RequestSequence,
    ResponseError, ResponseItem, ResponseSequence, SKIPPED_MESSAGE,
};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
pub use service::{BatchCallService, BATCH_CALL_METHOD};
