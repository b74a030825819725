//! Error types for stage execution.

use crate::article::ArticleError;
use crate::domain::error::UpstreamError;
use crate::stages::roles::Stage;

/// Errors produced by a single stage invocation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StageError {
    #[error("{stage} stage failed: {source}")]
    Upstream {
        stage: Stage,
        #[source]
        source: UpstreamError,
    },

    #[error("{stage} stage timed out after {secs}s")]
    Timeout { stage: Stage, secs: u64 },

    #[error("{stage} stage returned an empty response")]
    EmptyResponse { stage: Stage },

    #[error("runner for {runner} received input addressed to {input}")]
    StageMismatch { runner: Stage, input: Stage },

    #[error("news sources unavailable: {0}")]
    SourcesUnavailable(String),

    #[error("final article is malformed: {0}")]
    MalformedArticle(#[from] ArticleError),

    #[error("run cancelled")]
    Cancelled,

    #[error("run deadline of {secs}s exceeded")]
    DeadlineExceeded { secs: u64 },
}

impl StageError {
    /// The stage this error is attributable to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            StageError::Upstream { stage, .. }
            | StageError::Timeout { stage, .. }
            | StageError::EmptyResponse { stage } => Some(*stage),
            StageError::StageMismatch { runner, .. } => Some(*runner),
            StageError::SourcesUnavailable(_) => Some(Stage::Investigator),
            StageError::MalformedArticle(_) => Some(Stage::Reviewer),
            StageError::Cancelled | StageError::DeadlineExceeded { .. } => None,
        }
    }
}

/// Result type for stage operations.
pub type StageResult<T> = std::result::Result<T, StageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_names_stage() {
        let err = StageError::Upstream {
            stage: Stage::Critic,
            source: UpstreamError::Transport("connection reset".to_string()),
        };
        assert_eq!(err.stage(), Some(Stage::Critic));
        assert!(err.to_string().contains("critic"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_cancellation_has_no_stage() {
        assert_eq!(StageError::Cancelled.stage(), None);
        assert_eq!(StageError::DeadlineExceeded { secs: 5 }.stage(), None);
    }

    #[test]
    fn test_malformed_article_is_attributed_to_reviewer() {
        let err = StageError::from(ArticleError::MissingRoot);
        assert_eq!(err.stage(), Some(Stage::Reviewer));
    }
}
