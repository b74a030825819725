//! Observability tests for pipeline run lifecycle tracing.
//!
//! These verify that structured events are emitted for run start/finish,
//! stage calls, gate verdicts and budget exhaustion.

use std::sync::Arc;

use newsroom_core::fakes::ScriptedReasoningClient;
use newsroom_core::metrics::METRICS;
use newsroom_core::obs::{
    emit_gate_evaluated, emit_quality_exhausted, emit_run_finished, emit_run_started,
    emit_sources_failed, RunSpan,
};
use newsroom_core::{classify, NewsRequest, PipelineConfig, PipelineOrchestrator, Stage};
use tracing_test::traced_test;

#[traced_test]
#[test]
fn test_emit_run_started_logs_budget() {
    emit_run_started("run-123", 3, 0.8);
    assert!(logs_contain("run.started"));
    assert!(logs_contain("run-123"));
}

#[traced_test]
#[test]
fn test_emit_run_finished_logs_outcome() {
    emit_run_finished("run-456", "quality_exhausted", 5000, 7);
    assert!(logs_contain("run.finished"));
    assert!(logs_contain("quality_exhausted"));
}

#[traced_test]
#[test]
fn test_emit_gate_evaluated_logs_code() {
    emit_gate_evaluated(2, &classify("CODE01 sesgo"));
    assert!(logs_contain("gate.evaluated"));
    assert!(logs_contain("CODE01"));
}

#[traced_test]
#[test]
fn test_warning_events() {
    emit_quality_exhausted(3);
    emit_sources_failed("tema", "timeout");
    assert!(logs_contain("run.quality_exhausted"));
    assert!(logs_contain("sources.failed"));
}

#[traced_test]
#[tokio::test]
async fn test_run_span_tags_events() {
    let span = RunSpan::new("run-span-1", "tema");
    span.attach(async {
        tracing::info!("inside run");
    })
    .await;
    assert!(logs_contain("run-span-1"));
}

#[traced_test]
#[tokio::test]
async fn test_orchestrator_emits_lifecycle_events() {
    let client = Arc::new(
        ScriptedReasoningClient::new()
            .respond(Stage::Planner, "P")
            .respond(Stage::Investigator, "R")
            .respond(Stage::Critic, "CODE01"),
    );
    let before = METRICS.runs_exhausted();

    let run = PipelineOrchestrator::new(client, PipelineConfig::default())
        .run(&NewsRequest::with_options("tema", Some(1), None).unwrap())
        .await;

    assert!(run.result.is_quality_exhausted());
    assert!(logs_contain("run.started"));
    assert!(logs_contain("stage.started"));
    assert!(logs_contain("gate.evaluated"));
    assert!(logs_contain("run.quality_exhausted"));
    assert!(logs_contain("run.finished"));
    assert!(logs_contain(&run.run_id.to_string()));
    assert!(METRICS.runs_exhausted() > before);
}
