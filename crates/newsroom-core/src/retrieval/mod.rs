//! Information retrieval: candidate source lookup for the investigator.

pub mod news_api;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::error::UpstreamError;

pub use news_api::NewsApiClient;

/// Text used when a search returns no candidates.
pub const NO_ARTICLES: &str = "No se encontraron artículos.";

const SNIPPET_CHARS: usize = 200;

/// One candidate source record as returned by the news backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    /// Media type ("article", "video", ...).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Outcome of a search. Failure is a value, not an error: the caller
/// decides whether missing sources are fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub success: bool,
    pub articles: Vec<SourceArticle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchOutcome {
    pub fn found(articles: Vec<SourceArticle>) -> Self {
        Self {
            success: true,
            articles,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            articles: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Full text pulled from a single article URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContent {
    pub url: String,
    pub content: String,
    pub content_length: u64,
}

/// Health report from the news backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendHealth {
    pub status: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Source lookup backend.
#[async_trait]
pub trait InformationRetriever: Send + Sync {
    /// Ranked candidates for `query`, optionally filtered by `interests`.
    async fn search(&self, query: &str, interests: &[String]) -> SearchOutcome;

    /// Fetch the full content behind `url`.
    async fn extract(&self, url: &str) -> Result<ExtractedContent, UpstreamError>;

    async fn health(&self) -> Result<BackendHealth, UpstreamError>;
}

/// Render articles as the numbered plain-text block fed to the investigator.
pub fn format_articles(articles: &[SourceArticle]) -> String {
    if articles.is_empty() {
        return NO_ARTICLES.to_string();
    }

    let mut out = String::new();
    for (i, article) in articles.iter().enumerate() {
        out.push_str(&format!(
            "{}. {}\n   Fuente: {}\n   URL: {}\n",
            i + 1,
            article.title.as_deref().unwrap_or("Sin título"),
            article.source.as_deref().unwrap_or("Desconocida"),
            article.url.as_deref().unwrap_or("N/A"),
        ));
        if let Some(snippet) = article.snippet.as_deref().filter(|s| !s.is_empty()) {
            let truncated: String = snippet.chars().take(SNIPPET_CHARS).collect();
            out.push_str(&format!("   Resumen: {truncated}...\n"));
        }
        if let Some(kind) = article.kind.as_deref().filter(|s| !s.is_empty()) {
            out.push_str(&format!("   Tipo: {kind}\n"));
        }
        out.push('\n');
    }
    out
}
