//! chainbatch-http — HTTP JSON-RPC [`CanisterCaller`](chainbatch_core::CanisterCaller)
//! for chainbatch.
//!
//! # Quick start
//! ```rust,no_run
//! use chainbatch_core::BatchCallService;
//! use chainbatch_http::HttpCanisterCaller;
//! use std::sync::Arc;
//!
//! let caller = HttpCanisterCaller::default_for("http://127.0.0.1:4943/rpc").unwrap();
//! let service = BatchCallService::with_caller(Arc::new(caller));
//! ```

pub mod client;

pub use client::{HttpCallerConfig, HttpCanisterCaller, CALL_METHOD, POLL_METHOD};
