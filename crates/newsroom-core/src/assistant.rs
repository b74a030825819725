//! Free-form question answering and topic suggestions.
//!
//! Single reasoning calls outside the article pipeline, made with the
//! general news-researcher persona.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};

use crate::domain::error::{NewsroomError, UpstreamError, ValidationError};
use crate::reasoning::ReasoningClient;
use crate::stages::prompts::{query_prompt, suggestions_prompt};
use crate::stages::roles::RoleDescriptor;

/// Upper bound on returned suggestions.
pub const MAX_SUGGESTIONS: usize = 5;

pub static ASSISTANT_ROLE: RoleDescriptor = RoleDescriptor {
    key: "assistant",
    role: "Investigador de Noticias",
    goal: "Investigar y analizar información sobre temas solicitados",
    backstory: "Eres un experto investigador que puede analizar información, resumir contenido y \
proporcionar insights valiosos sobre cualquier tema. Tienes experiencia en investigación \
periodística y análisis de datos.",
};

#[derive(Clone)]
pub struct NewsAssistant {
    client: Arc<dyn ReasoningClient>,
    timeout: Duration,
}

impl NewsAssistant {
    pub fn new(client: Arc<dyn ReasoningClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Answer a free-form question.
    #[instrument(skip(self))]
    pub async fn answer(&self, query: &str) -> Result<String, NewsroomError> {
        let query = non_blank(query)?;
        let text = self.invoke(&query_prompt(query)).await?;
        info!(event = "assistant.answered", chars = text.chars().count());
        Ok(text)
    }

    /// Suggest up to [`MAX_SUGGESTIONS`] related topics.
    #[instrument(skip(self, context), fields(context_len = context.len()))]
    pub async fn suggest(
        &self,
        query: &str,
        context: &[String],
    ) -> Result<Vec<String>, NewsroomError> {
        let query = non_blank(query)?;
        let text = self.invoke(&suggestions_prompt(query, context)).await?;
        let suggestions = split_suggestions(&text);
        info!(event = "assistant.suggested", count = suggestions.len());
        Ok(suggestions)
    }

    async fn invoke(&self, prompt: &str) -> Result<String, UpstreamError> {
        match tokio::time::timeout(self.timeout, self.client.invoke(&ASSISTANT_ROLE, prompt)).await
        {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

fn non_blank(query: &str) -> Result<&str, ValidationError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyQuery)
    } else {
        Ok(trimmed)
    }
}

/// Non-empty trimmed lines, capped at [`MAX_SUGGESTIONS`].
pub fn split_suggestions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(MAX_SUGGESTIONS)
        .map(String::from)
        .collect()
}
