//! Pipeline outcome types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::article::Article;
use crate::quality_gate::{CritiqueCode, CritiqueVerdict};
use crate::stages::roles::Stage;

/// The externally observed outcome of one pipeline invocation.
///
/// Exactly one shape is produced per run; there is no partial mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineResult {
    /// The critique loop approved and the reviewer produced a final article.
    Success {
        article: Article,
        plan: String,
        /// Critique invocations actually performed.
        iterations_used: u32,
        final_code: CritiqueCode,
    },
    /// Every critique within the budget rejected the report.
    QualityExhausted {
        plan: String,
        last_report: String,
        last_verdict: CritiqueVerdict,
        iterations_used: u32,
    },
    /// A stage (or the run deadline) aborted the run.
    Failure {
        /// Stage that failed, when the failure is attributable to one.
        stage: Option<Stage>,
        error: String,
    },
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResult::Success { .. })
    }

    pub fn is_quality_exhausted(&self) -> bool {
        matches!(self, PipelineResult::QualityExhausted { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, PipelineResult::Failure { .. })
    }

    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineResult::Success { .. } => "success",
            PipelineResult::QualityExhausted { .. } => "quality_exhausted",
            PipelineResult::Failure { .. } => "failure",
        }
    }
}

/// One reasoning call made during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCall {
    pub stage: Stage,
    /// Critique iteration the call belongs to (0 before the loop starts).
    pub iteration: u32,
    pub duration_ms: u64,
    pub ok: bool,
}

/// Auditable envelope around a [`PipelineResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub topic: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stage_calls: Vec<StageCall>,
    pub result: PipelineResult,
}

impl PipelineRun {
    /// Number of calls made for `stage`, successful or not.
    pub fn calls_for(&self, stage: Stage) -> usize {
        self.stage_calls.iter().filter(|c| c.stage == stage).count()
    }

    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }
}
