//! `BatchExecutor` — runs a request sequence batch by batch.
//!
//! Every request of a batch is launched before any outcome is inspected, and
//! the batch is settled with `join_all`, so one failing call never cancels
//! its siblings. After a batch settles, a single `CallFailed` outcome marks
//! the execution as failed and every later batch is answered with
//! `Skipped` items without touching the caller.
//!
//! ```text
//! batch 0: [ok, ok]     → [Success, Success]
//! batch 1: [err]        → [Failure(1000)]        failed := true
//! batch 2: [·, ·]       → [Failure(1001), Failure(1001)]
//! ```

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::caller::CanisterCaller;
use crate::model::{ParallelBatch, RequestSequence, ResponseItem, ResponseSequence};

/// Per-execution failure state. Only ever moves `NotFailed → Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecutionState {
    NotFailed,
    Failed,
}

/// Executes one request sequence against a caller on behalf of a sender.
///
/// Holds no state between calls to [`execute`](Self::execute); build one per
/// invocation or reuse it freely.
pub struct BatchExecutor<'a, C: ?Sized> {
    caller: &'a C,
    sender: &'a str,
}

impl<'a, C: CanisterCaller + ?Sized> BatchExecutor<'a, C> {
    pub fn new(caller: &'a C, sender: &'a str) -> Self {
        Self { caller, sender }
    }

    /// Run every batch in order. The result has exactly one item per request,
    /// at the same `[batch][index]` position.
    pub async fn execute(&self, sequence: &RequestSequence) -> ResponseSequence {
        let mut state = ExecutionState::NotFailed;
        let mut responses = Vec::with_capacity(sequence.len());

        for (batch_idx, batch) in sequence.iter().enumerate() {
            if state == ExecutionState::Failed {
                debug!(batch = batch_idx, len = batch.len(), "skipping batch after earlier failure");
                responses.push(vec![ResponseItem::skipped(); batch.len()]);
                continue;
            }

            let items = self.settle_batch(batch_idx, batch).await;
            if items.iter().any(|item| !item.is_success()) {
                state = ExecutionState::Failed;
            }
            responses.push(items);
        }

        info!(
            caller = self.caller.name(),
            sender = self.sender,
            batches = sequence.len(),
            failed = state == ExecutionState::Failed,
            "batch sequence complete"
        );
        responses
    }

    /// Launch every call of `batch` and wait until all of them have settled.
    async fn settle_batch(&self, batch_idx: usize, batch: &ParallelBatch) -> Vec<ResponseItem> {
        debug!(batch = batch_idx, len = batch.len(), "launching batch");

        let outcomes = join_all(
            batch
                .iter()
                .map(|request| self.caller.call(self.sender, request)),
        )
        .await;

        outcomes
            .into_iter()
            .zip(batch)
            .enumerate()
            .map(|(idx, (outcome, request))| match outcome {
                Ok(result) => ResponseItem::success(result),
                Err(e) => {
                    warn!(
                        batch = batch_idx,
                        index = idx,
                        canister = %request.canister_id,
                        method = %request.method,
                        error = %e,
                        "canister call failed"
                    );
                    ResponseItem::call_failed(e.to_string())
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CallError;
    use crate::model::{CallRequest, ErrorCode, SKIPPED_MESSAGE};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted caller: method `ok:<v>` returns `v`, `fail:<msg>` fails with
    /// `msg`, `slow:<ms>:<v>` sleeps first. Records every call it receives.
    #[derive(Default)]
    struct ScriptedCaller {
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedCaller {
        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CanisterCaller for ScriptedCaller {
        async fn call(&self, _sender: &str, request: &CallRequest) -> Result<Value, CallError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.method.clone());

            let mut parts = request.method.splitn(3, ':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some("ok"), Some(v), None) => Ok(json!(v)),
                (Some("fail"), Some(msg), None) => Err(CallError::Other(msg.to_string())),
                (Some("slow"), Some(ms), Some(v)) => {
                    tokio::time::sleep(Duration::from_millis(ms.parse().unwrap())).await;
                    Ok(json!(v))
                }
                _ => Err(CallError::Other(format!("unscripted method {}", request.method))),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn req(method: &str) -> CallRequest {
        CallRequest::new("ryjl3-tyaaa-aaaaa-aaaba-cai", method, "")
    }

    fn seq(batches: &[&[&str]]) -> RequestSequence {
        batches
            .iter()
            .map(|b| b.iter().map(|m| req(m)).collect())
            .collect()
    }

    async fn run(caller: &ScriptedCaller, sequence: &RequestSequence) -> ResponseSequence {
        BatchExecutor::new(caller, "2vxsx-fae").execute(sequence).await
    }

    #[tokio::test]
    async fn all_success() {
        let caller = ScriptedCaller::default();
        let out = run(&caller, &seq(&[&["ok:a", "ok:b"]])).await;
        assert_eq!(
            out,
            vec![vec![ResponseItem::success(json!("a")), ResponseItem::success(json!("b"))]]
        );
    }

    #[tokio::test]
    async fn all_failure_keeps_distinct_messages() {
        let caller = ScriptedCaller::default();
        let out = run(&caller, &seq(&[&["fail:first", "fail:second"]])).await;
        assert_eq!(
            out,
            vec![vec![
                ResponseItem::call_failed("first"),
                ResponseItem::call_failed("second"),
            ]]
        );
    }

    #[tokio::test]
    async fn mixed_batch_keeps_sibling_success() {
        let caller = ScriptedCaller::default();
        let out = run(&caller, &seq(&[&["ok:a", "fail:b broke"]])).await;
        assert_eq!(
            out,
            vec![vec![ResponseItem::success(json!("a")), ResponseItem::call_failed("b broke")]]
        );
    }

    #[tokio::test]
    async fn later_batch_skipped_without_calling() {
        let caller = ScriptedCaller::default();
        let out = run(&caller, &seq(&[&["ok:a", "fail:nope"], &["ok:never"]])).await;

        assert_eq!(out.len(), 2);
        assert_eq!(out[0][1], ResponseItem::call_failed("nope"));
        assert_eq!(out[1], vec![ResponseItem::skipped()]);
        match &out[1][0] {
            ResponseItem::Failure { error } => {
                assert_eq!(error.code, ErrorCode::Skipped);
                assert_eq!(error.message, SKIPPED_MESSAGE);
                assert!(error.data.is_none());
            }
            other => panic!("expected skipped failure, got {other:?}"),
        }
        assert_eq!(caller.call_count(), 2);
        assert!(!caller.seen.lock().unwrap().contains(&"ok:never".to_string()));
    }

    #[tokio::test]
    async fn failure_propagates_to_every_later_batch() {
        let caller = ScriptedCaller::default();
        let out = run(
            &caller,
            &seq(&[&["ok:1", "ok:2"], &["fail:x"], &["ok:ne1", "ok:ne2"]]),
        )
        .await;

        assert!(out[0].iter().all(ResponseItem::is_success));
        assert_eq!(out[1], vec![ResponseItem::call_failed("x")]);
        assert_eq!(out[2], vec![ResponseItem::skipped(), ResponseItem::skipped()]);
        assert_eq!(caller.call_count(), 3);
    }

    #[tokio::test]
    async fn failing_slot_does_not_stop_its_batch() {
        let caller = ScriptedCaller::default();
        let out = run(
            &caller,
            &seq(&[&["ok:a", "ok:b", "fail:c", "ok:d"], &["ok:e"]]),
        )
        .await;

        assert_eq!(caller.call_count(), 4);
        let codes: Vec<_> = out[0].iter().map(ResponseItem::error_code).collect();
        assert_eq!(codes, vec![None, None, Some(ErrorCode::CallFailed), None]);
        assert_eq!(out[1], vec![ResponseItem::skipped()]);
    }

    #[tokio::test(start_paused = true)]
    async fn output_order_ignores_completion_order() {
        let caller = ScriptedCaller::default();
        let out = run(&caller, &seq(&[&["slow:30:first", "slow:10:second", "ok:third"]])).await;
        assert_eq!(
            out[0],
            vec![
                ResponseItem::success(json!("first")),
                ResponseItem::success(json!("second")),
                ResponseItem::success(json!("third")),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn batch_calls_run_concurrently() {
        let caller = ScriptedCaller::default();
        let start = tokio::time::Instant::now();
        run(&caller, &seq(&[&["slow:100:a", "slow:100:b", "slow:100:c"]])).await;
        assert!(start.elapsed() < Duration::from_millis(150));
    }

    #[tokio::test(start_paused = true)]
    async fn batches_run_sequentially() {
        let caller = ScriptedCaller::default();
        let start = tokio::time::Instant::now();
        run(&caller, &seq(&[&["slow:100:a"], &["slow:100:b"]])).await;
        assert!(start.elapsed() >= Duration::from_millis(200));
        assert_eq!(*caller.seen.lock().unwrap(), vec!["slow:100:a", "slow:100:b"]);
    }

    #[tokio::test]
    async fn shape_mirrors_request_sequence() {
        let caller = ScriptedCaller::default();
        let sequence = seq(&[&["ok:a"], &["ok:b", "fail:c", "ok:d"], &["ok:e", "ok:f"], &["ok:g"]]);
        let out = run(&caller, &sequence).await;

        assert_eq!(out.len(), sequence.len());
        for (batch_out, batch_in) in out.iter().zip(&sequence) {
            assert_eq!(batch_out.len(), batch_in.len());
        }
    }

    #[tokio::test]
    async fn repeated_runs_have_identical_shape() {
        let caller = ScriptedCaller::default();
        let sequence = seq(&[&["ok:a", "fail:b"], &["ok:c"]]);
        let first = run(&caller, &sequence).await;
        let second = run(&caller, &sequence).await;
        assert_eq!(first, second);
    }
}
