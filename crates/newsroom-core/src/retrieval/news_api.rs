//! HTTP adapter for the news aggregation backend.
//!
//! The backend wraps every payload in `{status, data, message}`; anything
//! other than `status == "success"` is reported with the backend's message.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RetrievalConfig;
use crate::domain::error::UpstreamError;
use crate::retrieval::{
    BackendHealth, ExtractedContent, InformationRetriever, SearchOutcome, SourceArticle,
};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
const UNKNOWN_ERROR: &str = "Error desconocido";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    status: Option<String>,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T, String> {
        match (self.status.as_deref(), self.data) {
            (Some("success"), Some(data)) => Ok(data),
            (Some("success"), None) => Err("respuesta sin datos".to_string()),
            _ => Err(self.message.unwrap_or_else(|| UNKNOWN_ERROR.to_string())),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ArticleList {
    #[serde(default)]
    articles: Vec<SourceArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractData {
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    content_length: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    query: &'a str,
    user_interests: &'a [String],
}

/// Client for `/api/news/*`.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: Client,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(config: &RetrievalConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .user_agent(concat!("newsroom/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/news/{path}", self.base_url)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, UpstreamError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, message });
        }
        let envelope: Envelope<T> = response.json().await?;
        envelope.into_data().map_err(UpstreamError::InvalidResponse)
    }

    /// Simplified multi-source aggregation without interest filtering.
    pub async fn aggregate(&self, query: &str) -> SearchOutcome {
        debug!(query, "aggregating news");
        let body = serde_json::json!({ "query": query });
        outcome(self.post::<_, ArticleList>("aggregate", &body).await)
    }
}

fn outcome(result: Result<ArticleList, UpstreamError>) -> SearchOutcome {
    match result {
        Ok(list) => SearchOutcome::found(list.articles),
        Err(UpstreamError::InvalidResponse(message)) => SearchOutcome::failed(message),
        Err(e) => {
            warn!(error = %e, "news backend request failed");
            SearchOutcome::failed(format!("Error de conexión: {e}"))
        }
    }
}

#[async_trait]
impl InformationRetriever for NewsApiClient {
    async fn search(&self, query: &str, interests: &[String]) -> SearchOutcome {
        debug!(query, interests = interests.len(), "searching news");
        let body = SearchBody {
            query,
            user_interests: interests,
        };
        outcome(self.post::<_, ArticleList>("search", &body).await)
    }

    async fn extract(&self, url: &str) -> Result<ExtractedContent, UpstreamError> {
        let body = serde_json::json!({ "url": url });
        let data: ExtractData = self.post("extract", &body).await?;
        Ok(ExtractedContent {
            url: if data.url.is_empty() {
                url.to_string()
            } else {
                data.url
            },
            content: data.content,
            content_length: data.content_length,
        })
    }

    async fn health(&self) -> Result<BackendHealth, UpstreamError> {
        let response = self
            .http
            .get(self.url("health"))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await?;
        let status = response.status().as_u16();
        if status >= 400 {
            return Err(UpstreamError::Status {
                status,
                message: "Servicio no disponible".to_string(),
            });
        }
        Ok(response.json().await?)
    }
}
