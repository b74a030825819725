//! Structured observability hooks for pipeline run lifecycle events.
//!
//! This module provides:
//! - Run-scoped tracing spans via [`RunSpan`]
//! - Emission functions for key lifecycle events: run start/finish, stage
//!   start/finish, gate verdicts, source pre-fetch and budget exhaustion
//!
//! Events are emitted at `info!` level unless noted; filter with `RUST_LOG`.

use std::future::Future;

use tracing::instrument::Instrumented;
use tracing::{info, warn, Instrument};

use crate::quality_gate::CritiqueVerdict;
use crate::stages::error::StageError;
use crate::stages::roles::Stage;

/// Span tagged with the run id and topic. Every event emitted while a run's
/// future is polled is attached to it.
///
/// # Example
///
/// ```ignore
/// let span = RunSpan::new("6f1c...", "elecciones");
/// let result = span.attach(async { /* stages */ }).await;
/// ```
#[derive(Debug, Clone)]
pub struct RunSpan {
    span: tracing::Span,
}

impl RunSpan {
    pub fn new(run_id: &str, topic: &str) -> Self {
        Self {
            span: tracing::info_span!("newsroom.run", run_id = %run_id, topic = %topic),
        }
    }

    /// Attach the span to `fut`. Safe across `.await` points.
    pub fn attach<F: Future>(&self, fut: F) -> Instrumented<F> {
        fut.instrument(self.span.clone())
    }

    /// Run a synchronous closure inside the span.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        self.span.in_scope(f)
    }
}

pub fn emit_run_started(run_id: &str, max_iterations: u32, quality_threshold: f64) {
    info!(
        event = "run.started",
        run_id = %run_id,
        max_iterations = max_iterations,
        quality_threshold = quality_threshold,
    );
}

/// Emit event: run finished with its outcome label and total duration.
pub fn emit_run_finished(run_id: &str, outcome: &str, duration_ms: u64, stage_calls: usize) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        outcome = %outcome,
        duration_ms = duration_ms,
        stage_calls = stage_calls,
    );
}

pub fn emit_stage_started(stage: Stage) {
    info!(event = "stage.started", stage = %stage);
}

/// Emit event: stage finished. Failures are logged at `warn!`.
pub fn emit_stage_finished(stage: Stage, duration_ms: u64, error: Option<&StageError>) {
    match error {
        None => info!(event = "stage.finished", stage = %stage, duration_ms = duration_ms, ok = true),
        Some(e) => warn!(
            event = "stage.finished",
            stage = %stage,
            duration_ms = duration_ms,
            ok = false,
            error = %e,
        ),
    }
}

/// Emit event: critique classified.
pub fn emit_gate_evaluated(iteration: u32, verdict: &CritiqueVerdict) {
    info!(
        event = "gate.evaluated",
        iteration = iteration,
        code = %verdict.code,
        basis = ?verdict.basis,
    );
}

pub fn emit_sources_fetched(query: &str, count: usize) {
    info!(event = "sources.fetched", query = %query, count = count);
}

/// Emit event: source pre-fetch failed (warning level).
pub fn emit_sources_failed(query: &str, error: &str) {
    warn!(event = "sources.failed", query = %query, error = %error);
}

/// Emit event: the critique budget ran out (warning level).
pub fn emit_quality_exhausted(iterations_used: u32) {
    warn!(event = "run.quality_exhausted", iterations_used = iterations_used);
}

/// Emit event: the drafted article did not match the expected structure.
pub fn emit_draft_malformed(error: &dyn std::fmt::Display) {
    warn!(event = "draft.malformed", error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_span_attaches_to_future() {
        let span = RunSpan::new("test-run-id", "tema");
        let value = span.attach(async { 7 }).await;
        assert_eq!(value, 7);
    }
}
