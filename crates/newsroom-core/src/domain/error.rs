//! Domain-level error taxonomy for the newsroom pipeline.

/// Errors produced while validating an inbound news request.
///
/// These never reach the orchestrator; the service maps them to HTTP 400.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("request topic must not be empty")]
    EmptyTopic,

    #[error("query must not be empty")]
    EmptyQuery,

    #[error("max_iterations must be at least 1, got {0}")]
    InvalidMaxIterations(u32),

    #[error("quality_threshold must be within [0, 1], got {0}")]
    InvalidQualityThreshold(f64),
}

/// Failure talking to an external collaborator (reasoning or retrieval backend).
///
/// Cloneable so scripted fakes can replay the same failure more than once.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UpstreamError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("backend timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("backend not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not expose the configured duration on the error.
            UpstreamError::Timeout { secs: 0 }
        } else if err.is_decode() {
            UpstreamError::InvalidResponse(err.to_string())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}

/// Top-level error for operations outside the orchestrator's result envelope.
#[derive(Debug, thiserror::Error)]
pub enum NewsroomError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for newsroom domain operations.
pub type Result<T> = std::result::Result<T, NewsroomError>;
