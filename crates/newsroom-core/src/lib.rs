//! Newsroom Core Library
//!
//! Turns a free-text request into a news article by passing it through a
//! fixed pipeline of roles (planner, investigator, critic, writer, reviewer)
//! with a bounded critique/re-investigation loop. Re-exports the pieces
//! needed to embed the pipeline.

pub mod article;
pub mod assistant;
pub mod cancel;
pub mod config;
pub mod domain;
pub mod fakes;
pub mod metrics;
pub mod obs;
pub mod orchestrator;
pub mod quality_gate;
pub mod reasoning;
pub mod retrieval;
pub mod stages;
pub mod telemetry;

pub use article::{validate_article, Article, ArticleError};

pub use assistant::{NewsAssistant, MAX_SUGGESTIONS};

pub use cancel::{CancelHandle, CancelSignal};

pub use config::{
    ConfigError, NewsroomConfig, PipelineConfig, ReasoningConfig, RetrievalConfig, ServerConfig,
};

pub use domain::{
    NewsRequest, NewsroomError, PipelineResult, PipelineRun, Result, StageCall, UpstreamError,
    ValidationError, DEFAULT_MAX_ITERATIONS, DEFAULT_QUALITY_THRESHOLD,
};

pub use orchestrator::{PipelineOrchestrator, SourcePolicy};

pub use quality_gate::{
    classify, CritiqueCode, CritiqueVerdict, GateStrategy, QualityGate, VerdictBasis,
};

pub use reasoning::{OpenAiClient, ReasoningClient};

pub use retrieval::{
    format_articles, BackendHealth, ExtractedContent, InformationRetriever, NewsApiClient,
    SearchOutcome, SourceArticle, NO_ARTICLES,
};

pub use stages::{Stage, StageError};

/// Crate version, reported by the binaries.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
