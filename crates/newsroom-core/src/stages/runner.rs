//! Single-stage execution against the reasoning backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::metrics::METRICS;
use crate::obs;
use crate::reasoning::ReasoningClient;
use crate::stages::error::{StageError, StageResult};
use crate::stages::prompts::{build_prompt, StageInput};
use crate::stages::roles::Stage;

/// Raw text returned by a stage together with how long it took.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput {
    pub text: String,
    pub duration: Duration,
}

/// Runs one stage: prompt, one backend call, raw text. Never retries.
#[derive(Clone)]
pub struct StageRunner {
    stage: Stage,
    client: Arc<dyn ReasoningClient>,
    timeout: Duration,
}

impl std::fmt::Debug for StageRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRunner")
            .field("stage", &self.stage)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl StageRunner {
    pub fn new(stage: Stage, client: Arc<dyn ReasoningClient>, timeout: Duration) -> Self {
        Self {
            stage,
            client,
            timeout,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Build the prompt for `input` and invoke the backend once.
    #[instrument(skip(self, input), fields(stage = %self.stage))]
    pub async fn run(&self, input: &StageInput<'_>) -> StageResult<StageOutput> {
        if input.stage() != self.stage {
            return Err(StageError::StageMismatch {
                runner: self.stage,
                input: input.stage(),
            });
        }

        let prompt = build_prompt(input);
        let descriptor = self.stage.descriptor();
        debug!(prompt_chars = prompt.chars().count(), "stage prompt built");
        obs::emit_stage_started(self.stage);
        METRICS.inc_stage_calls();

        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.client.invoke(descriptor, &prompt)).await;
        let duration = started.elapsed();

        let result = match outcome {
            Err(_) => Err(StageError::Timeout {
                stage: self.stage,
                secs: self.timeout.as_secs(),
            }),
            Ok(Err(source)) => Err(StageError::Upstream {
                stage: self.stage,
                source,
            }),
            Ok(Ok(text)) if text.trim().is_empty() => {
                Err(StageError::EmptyResponse { stage: self.stage })
            }
            Ok(Ok(text)) => Ok(StageOutput { text, duration }),
        };

        obs::emit_stage_finished(
            self.stage,
            duration.as_millis() as u64,
            result.as_ref().err(),
        );
        result
    }
}

/// The five runners for one pipeline run.
#[derive(Debug, Clone)]
pub struct StageRoster {
    pub planner: StageRunner,
    pub investigator: StageRunner,
    pub critic: StageRunner,
    pub writer: StageRunner,
    pub reviewer: StageRunner,
}

impl StageRoster {
    pub fn build(client: Arc<dyn ReasoningClient>, stage_timeout: Duration) -> Self {
        let runner = |stage| StageRunner::new(stage, Arc::clone(&client), stage_timeout);
        Self {
            planner: runner(Stage::Planner),
            investigator: runner(Stage::Investigator),
            critic: runner(Stage::Critic),
            writer: runner(Stage::Writer),
            reviewer: runner(Stage::Reviewer),
        }
    }

    pub fn get(&self, stage: Stage) -> &StageRunner {
        match stage {
            Stage::Planner => &self.planner,
            Stage::Investigator => &self.investigator,
            Stage::Critic => &self.critic,
            Stage::Writer => &self.writer,
            Stage::Reviewer => &self.reviewer,
        }
    }

    /// Dispatch `input` to the runner for its stage.
    pub async fn run(&self, input: &StageInput<'_>) -> StageResult<StageOutput> {
        self.get(input.stage()).run(input).await
    }
}
