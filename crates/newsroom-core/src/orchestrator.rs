//! Pipeline orchestration: plan, investigate, critique with bounded
//! backtracking, write, review.
//!
//! The orchestrator is an explicit state machine over [`Phase`]. It holds
//! only immutable configuration and shared clients, so one instance can
//! drive any number of concurrent runs; each run owns its own
//! [`IterationState`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::article::{validate_article, Article};
use crate::cancel::CancelSignal;
use crate::config::{PipelineConfig, RetrievalConfig};
use crate::domain::request::NewsRequest;
use crate::domain::result::{PipelineResult, PipelineRun, StageCall};
use crate::metrics::METRICS;
use crate::obs::{self, RunSpan};
use crate::quality_gate::{CritiqueCode, CritiqueVerdict, QualityGate};
use crate::reasoning::ReasoningClient;
use crate::retrieval::{format_articles, InformationRetriever};
use crate::stages::error::{StageError, StageResult};
use crate::stages::prompts::StageInput;
use crate::stages::runner::StageRoster;

const UNKNOWN_ERROR: &str = "Error desconocido";

/// How the optional news search feeds the investigator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcePolicy {
    pub interests: Vec<String>,
    pub require_sources: bool,
    pub refetch_on_retry: bool,
}

impl From<&RetrievalConfig> for SourcePolicy {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            interests: config.interests.clone(),
            require_sources: config.require_sources,
            refetch_on_retry: config.refetch_on_retry,
        }
    }
}

/// Pipeline position.
#[derive(Debug)]
enum Phase {
    Planning,
    Investigating,
    Critiquing,
    Reinvestigating,
    Writing,
    FinalReview { draft: String },
    Done(PipelineResult),
}

/// Loop-local state. Never outlives a run.
#[derive(Debug, Default)]
struct IterationState {
    /// Critique invocations performed so far.
    iteration: u32,
    report: String,
    verdict: Option<CritiqueVerdict>,
}

impl IterationState {
    fn critique_text(&self) -> &str {
        self.verdict.as_ref().map(|v| v.text.as_str()).unwrap_or_default()
    }
}

/// Drives [`NewsRequest`]s through the five stages.
#[derive(Clone)]
pub struct PipelineOrchestrator {
    reasoning: Arc<dyn ReasoningClient>,
    retriever: Option<Arc<dyn InformationRetriever>>,
    sources: SourcePolicy,
    gate: QualityGate,
    config: PipelineConfig,
}

impl std::fmt::Debug for PipelineOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOrchestrator")
            .field("retriever", &self.retriever.is_some())
            .field("sources", &self.sources)
            .field("gate", &self.gate)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PipelineOrchestrator {
    pub fn new(reasoning: Arc<dyn ReasoningClient>, config: PipelineConfig) -> Self {
        Self {
            reasoning,
            retriever: None,
            sources: SourcePolicy::default(),
            gate: QualityGate::new(config.gate_strategy),
            config,
        }
    }

    /// Pre-fetch sources from `retriever` before each investigation.
    pub fn with_retriever(
        mut self,
        retriever: Arc<dyn InformationRetriever>,
        policy: SourcePolicy,
    ) -> Self {
        self.retriever = Some(retriever);
        self.sources = policy;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn gate(&self) -> QualityGate {
        self.gate
    }

    /// Run the pipeline to completion.
    pub async fn run(&self, request: &NewsRequest) -> PipelineRun {
        self.run_with_cancel(request, CancelSignal::never()).await
    }

    /// Run the pipeline, abandoning it when `cancel` fires.
    ///
    /// Never returns an error: every failure is folded into
    /// [`PipelineResult::Failure`].
    pub async fn run_with_cancel(
        &self,
        request: &NewsRequest,
        mut cancel: CancelSignal,
    ) -> PipelineRun {
        let run_id = Uuid::new_v4();
        let run_label = run_id.to_string();
        let started_at = Utc::now();
        let clock = Instant::now();
        let span = RunSpan::new(&run_label, request.topic());

        METRICS.inc_runs_started();
        let mut journal: Vec<StageCall> = Vec::new();

        let outcome = span
            .attach(async {
                obs::emit_run_started(
                    &run_label,
                    request.max_iterations(),
                    request.quality_threshold(),
                );
                let roster = StageRoster::build(
                    Arc::clone(&self.reasoning),
                    Duration::from_secs(self.config.stage_timeout_secs),
                );
                let drive = bounded(
                    self.drive(request, &roster, &mut journal),
                    self.config.run_timeout_secs,
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(StageError::Cancelled),
                    result = drive => result,
                }
            })
            .await;

        let result = match outcome {
            Ok(result) => result,
            Err(e) => PipelineResult::Failure {
                stage: e.stage(),
                error: e.to_string(),
            },
        };

        match &result {
            PipelineResult::Success { .. } => METRICS.inc_runs_succeeded(),
            PipelineResult::QualityExhausted { .. } => METRICS.inc_runs_exhausted(),
            PipelineResult::Failure { .. } => METRICS.inc_runs_failed(),
        }
        span.in_scope(|| {
            obs::emit_run_finished(
                &run_label,
                result.label(),
                clock.elapsed().as_millis() as u64,
                journal.len(),
            )
        });
        METRICS.flush();

        PipelineRun {
            run_id,
            topic: request.topic().to_string(),
            started_at,
            finished_at: Utc::now(),
            stage_calls: journal,
            result,
        }
    }

    async fn drive(
        &self,
        request: &NewsRequest,
        roster: &StageRoster,
        journal: &mut Vec<StageCall>,
    ) -> StageResult<PipelineResult> {
        let topic = request.topic();
        let max_iterations = request.max_iterations();
        let mut plan = String::new();
        let mut sources: Option<String> = None;
        let mut state = IterationState::default();
        let mut phase = Phase::Planning;

        loop {
            debug!(phase = phase_name(&phase), iteration = state.iteration, "pipeline transition");
            phase = match phase {
                Phase::Planning => {
                    plan = call(roster, &StageInput::Plan { request: topic }, 0, journal).await?;
                    Phase::Investigating
                }
                Phase::Investigating => {
                    sources = self.fetch_sources(topic).await?;
                    let input = StageInput::Investigate {
                        request: topic,
                        plan: &plan,
                        sources: sources.as_deref(),
                    };
                    state.report = call(roster, &input, 0, journal).await?;
                    state.iteration = 0;
                    Phase::Critiquing
                }
                Phase::Critiquing => {
                    state.iteration += 1;
                    let input = StageInput::Critique {
                        report: &state.report,
                        request: topic,
                    };
                    let critique = call(roster, &input, state.iteration, journal).await?;
                    let verdict = self.gate.classify(&critique);
                    obs::emit_gate_evaluated(state.iteration, &verdict);

                    if verdict.is_approved() {
                        state.verdict = Some(verdict);
                        Phase::Writing
                    } else {
                        METRICS.inc_critiques_rejected();
                        if state.iteration < max_iterations {
                            state.verdict = Some(verdict);
                            Phase::Reinvestigating
                        } else {
                            obs::emit_quality_exhausted(state.iteration);
                            Phase::Done(PipelineResult::QualityExhausted {
                                plan: std::mem::take(&mut plan),
                                last_report: std::mem::take(&mut state.report),
                                last_verdict: verdict,
                                iterations_used: state.iteration,
                            })
                        }
                    }
                }
                Phase::Reinvestigating => {
                    if self.sources.refetch_on_retry {
                        sources = self.fetch_sources(topic).await?;
                    }
                    let input = StageInput::Reinvestigate {
                        request: topic,
                        feedback: state.critique_text(),
                        plan: &plan,
                        sources: sources.as_deref(),
                    };
                    // The new report replaces the old one outright.
                    state.report = call(roster, &input, state.iteration, journal).await?;
                    Phase::Critiquing
                }
                Phase::Writing => {
                    // The approved critique text is the validated-facts payload.
                    let input = StageInput::Write {
                        validated_facts: state.critique_text(),
                        request: topic,
                    };
                    let draft = call(roster, &input, state.iteration, journal).await?;
                    if self.config.validate_article {
                        if let Err(e) = validate_article(&draft) {
                            obs::emit_draft_malformed(&e);
                        }
                    }
                    Phase::FinalReview { draft }
                }
                Phase::FinalReview { draft } => {
                    let input = StageInput::Review {
                        draft: &draft,
                        request: topic,
                        plan: &plan,
                    };
                    let text = call(roster, &input, state.iteration, journal).await?;
                    let article = if self.config.validate_article {
                        validate_article(&text)?
                    } else {
                        Article::unchecked(text.trim())
                    };
                    let final_code = state
                        .verdict
                        .as_ref()
                        .map(|v| v.code)
                        .unwrap_or(CritiqueCode::Approved);
                    Phase::Done(PipelineResult::Success {
                        article,
                        plan: std::mem::take(&mut plan),
                        iterations_used: state.iteration,
                        final_code,
                    })
                }
                Phase::Done(result) => return Ok(result),
            };
        }
    }

    /// Search for sources, formatted for the investigator prompt.
    async fn fetch_sources(&self, topic: &str) -> StageResult<Option<String>> {
        let Some(retriever) = &self.retriever else {
            return Ok(None);
        };
        let outcome = retriever.search(topic, &self.sources.interests).await;
        if outcome.success {
            obs::emit_sources_fetched(topic, outcome.articles.len());
            return Ok(Some(format_articles(&outcome.articles)));
        }

        let error = outcome.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        obs::emit_sources_failed(topic, &error);
        if self.sources.require_sources {
            return Err(StageError::SourcesUnavailable(error));
        }
        Ok(Some(format!(
            "No se pudieron obtener artículos del servicio de noticias ({error}). \
Continúa la investigación con tu propio conocimiento e indícalo en el informe."
        )))
    }
}

/// One stage call, journaled whether it succeeds or not.
async fn call(
    roster: &StageRoster,
    input: &StageInput<'_>,
    iteration: u32,
    journal: &mut Vec<StageCall>,
) -> StageResult<String> {
    let started = Instant::now();
    let result = roster.run(input).await;
    journal.push(StageCall {
        stage: input.stage(),
        iteration,
        duration_ms: started.elapsed().as_millis() as u64,
        ok: result.is_ok(),
    });
    result.map(|out| out.text)
}

/// Apply the whole-run deadline. `0` means unbounded.
async fn bounded<F>(fut: F, secs: u64) -> StageResult<PipelineResult>
where
    F: std::future::Future<Output = StageResult<PipelineResult>>,
{
    if secs == 0 {
        return fut.await;
    }
    match tokio::time::timeout(Duration::from_secs(secs), fut).await {
        Ok(result) => result,
        Err(_) => Err(StageError::DeadlineExceeded { secs }),
    }
}

fn phase_name(phase: &Phase) -> &'static str {
    match phase {
        Phase::Planning => "planning",
        Phase::Investigating => "investigating",
        Phase::Critiquing => "critiquing",
        Phase::Reinvestigating => "reinvestigating",
        Phase::Writing => "writing",
        Phase::FinalReview { .. } => "final_review",
        Phase::Done(_) => "done",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::ScriptedReasoningClient;
    use crate::stages::roles::Stage;

    #[test]
    fn test_source_policy_from_config() {
        let config = RetrievalConfig {
            interests: vec!["ciencia".into()],
            require_sources: true,
            ..RetrievalConfig::default()
        };
        let policy = SourcePolicy::from(&config);
        assert_eq!(policy.interests, vec!["ciencia"]);
        assert!(policy.require_sources);
        assert!(policy.refetch_on_retry);
    }

    #[tokio::test]
    async fn test_planner_failure_stops_before_investigation() {
        let client = Arc::new(ScriptedReasoningClient::new().fail(
            Stage::Planner,
            crate::domain::error::UpstreamError::Transport("down".into()),
        ));
        let orchestrator = PipelineOrchestrator::new(client.clone(), PipelineConfig::default());
        let run = orchestrator
            .run(&NewsRequest::new("tema").unwrap())
            .await;
        match run.result {
            PipelineResult::Failure { stage, .. } => assert_eq!(stage, Some(Stage::Planner)),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(client.stage_sequence(), vec![Stage::Planner]);
        assert_eq!(run.stage_calls.len(), 1);
        assert!(!run.stage_calls[0].ok);
    }
}
