//! In-memory fakes for the external collaborators (testing only)
//!
//! `ScriptedReasoningClient` replays canned responses per role and records
//! every prompt; `StaticRetriever` returns a fixed search outcome.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::error::UpstreamError;
use crate::reasoning::ReasoningClient;
use crate::retrieval::{
    BackendHealth, ExtractedContent, InformationRetriever, SearchOutcome, SourceArticle,
};
use crate::stages::roles::{RoleDescriptor, Stage};

type ReplyFn = Arc<dyn Fn(&str) -> Result<String, UpstreamError> + Send + Sync>;

#[derive(Clone)]
enum Reply {
    Fixed(Result<String, UpstreamError>),
    Computed(ReplyFn),
}

impl Reply {
    fn produce(&self, prompt: &str) -> Result<String, UpstreamError> {
        match self {
            Reply::Fixed(r) => r.clone(),
            Reply::Computed(f) => f(prompt),
        }
    }
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub key: String,
    pub prompt: String,
}

// ---------------------------------------------------------------------------
// ScriptedReasoningClient
// ---------------------------------------------------------------------------

/// Reasoning fake keyed by `RoleDescriptor::key`.
///
/// Each key holds a queue of replies. Replies are consumed in order until one
/// remains; the last reply then repeats forever. Keys without a script fail
/// with `UpstreamError::NotConfigured`.
#[derive(Default)]
pub struct ScriptedReasoningClient {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<RecordedCall>>,
    latency: Option<Duration>,
}

impl ScriptedReasoningClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, key: &str, reply: Reply) -> Self {
        self.scripts
            .get_mut()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue a text reply for `stage`.
    pub fn respond(self, stage: Stage, text: impl Into<String>) -> Self {
        self.push(stage.name(), Reply::Fixed(Ok(text.into())))
    }

    /// Queue several text replies for `stage`, in order.
    pub fn respond_seq<I, S>(mut self, stage: Stage, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for t in texts {
            self = self.respond(stage, t);
        }
        self
    }

    /// Queue a failure for `stage`.
    pub fn fail(self, stage: Stage, error: UpstreamError) -> Self {
        self.push(stage.name(), Reply::Fixed(Err(error)))
    }

    /// Queue a reply computed from the prompt.
    pub fn respond_with<F>(self, stage: Stage, f: F) -> Self
    where
        F: Fn(&str) -> Result<String, UpstreamError> + Send + Sync + 'static,
    {
        self.push(stage.name(), Reply::Computed(Arc::new(f)))
    }

    /// Queue a text reply for an arbitrary role key.
    pub fn respond_key(self, key: &str, text: impl Into<String>) -> Self {
        self.push(key, Reply::Fixed(Ok(text.into())))
    }

    /// Delay every reply by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, stage: Stage) -> usize {
        self.prompts_for(stage).len()
    }

    /// Prompts sent for `stage`, in call order.
    pub fn prompts_for(&self, stage: Stage) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.key == stage.name())
            .map(|c| c.prompt.clone())
            .collect()
    }

    /// Stage sequence of all calls made so far.
    pub fn stage_sequence(&self) -> Vec<Stage> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| Stage::ALL.into_iter().find(|s| s.name() == c.key))
            .collect()
    }

    fn next_reply(&self, key: &str) -> Option<Reply> {
        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl ReasoningClient for ScriptedReasoningClient {
    async fn invoke(&self, role: &RoleDescriptor, prompt: &str) -> Result<String, UpstreamError> {
        self.calls.lock().unwrap().push(RecordedCall {
            key: role.key.to_string(),
            prompt: prompt.to_string(),
        });
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.next_reply(role.key) {
            Some(reply) => reply.produce(prompt),
            None => Err(UpstreamError::NotConfigured(format!(
                "no scripted reply for role '{}'",
                role.key
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// StaticRetriever
// ---------------------------------------------------------------------------

/// Retriever fake that always returns the same outcome and records queries.
#[derive(Debug)]
pub struct StaticRetriever {
    outcome: SearchOutcome,
    queries: Mutex<Vec<(String, Vec<String>)>>,
}

impl StaticRetriever {
    pub fn with_articles(articles: Vec<SourceArticle>) -> Self {
        Self {
            outcome: SearchOutcome::found(articles),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            outcome: SearchOutcome::failed(error),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// `(query, interests)` pairs received so far.
    pub fn queries(&self) -> Vec<(String, Vec<String>)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl InformationRetriever for StaticRetriever {
    async fn search(&self, query: &str, interests: &[String]) -> SearchOutcome {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), interests.to_vec()));
        self.outcome.clone()
    }

    async fn extract(&self, url: &str) -> Result<ExtractedContent, UpstreamError> {
        let article = self
            .outcome
            .articles
            .iter()
            .find(|a| a.url.as_deref() == Some(url))
            .ok_or_else(|| UpstreamError::Status {
                status: 404,
                message: format!("unknown url {url}"),
            })?;
        let content = article.snippet.clone().unwrap_or_default();
        Ok(ExtractedContent {
            url: url.to_string(),
            content_length: content.chars().count() as u64,
            content,
        })
    }

    async fn health(&self) -> Result<BackendHealth, UpstreamError> {
        Ok(BackendHealth {
            status: Some("ok".to_string()),
            message: "static retriever".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::roles::CRITIC_ROLE;

    #[tokio::test]
    async fn test_last_reply_repeats() {
        let client = ScriptedReasoningClient::new().respond_seq(Stage::Critic, ["a", "b"]);
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(client.invoke(&CRITIC_ROLE, "p").await.unwrap());
        }
        assert_eq!(seen, vec!["a", "b", "b"]);
        assert_eq!(client.calls_for(Stage::Critic), 3);
    }

    #[tokio::test]
    async fn test_unscripted_role_fails() {
        let client = ScriptedReasoningClient::new();
        let err = client.invoke(&CRITIC_ROLE, "p").await.unwrap_err();
        assert!(matches!(err, UpstreamError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_static_retriever_records_queries() {
        let retriever = StaticRetriever::with_articles(vec![SourceArticle {
            url: Some("https://n/a".into()),
            snippet: Some("hola".into()),
            ..SourceArticle::default()
        }]);
        let outcome = retriever.search("q", &["x".to_string()]).await;
        assert!(outcome.success);
        assert_eq!(retriever.queries(), vec![("q".to_string(), vec!["x".to_string()])]);
        let content = retriever.extract("https://n/a").await.unwrap();
        assert_eq!(content.content_length, 4);
    }
}
