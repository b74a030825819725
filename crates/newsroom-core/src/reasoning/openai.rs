//! HTTP client for OpenAI-compatible chat-completions backends.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ReasoningConfig as Config;
use crate::domain::error::UpstreamError;
use crate::reasoning::ReasoningClient;
use crate::stages::roles::RoleDescriptor;

pub use crate::config::ReasoningConfig;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client with an explicit request timeout.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    config: Config,
}

impl OpenAiClient {
    /// Build a client from explicit configuration.
    pub fn new(config: Config) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .user_agent(concat!("newsroom/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ReasoningClient for OpenAiClient {
    async fn invoke(&self, role: &RoleDescriptor, prompt: &str) -> Result<String, UpstreamError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| UpstreamError::NotConfigured("reasoning API key is not set".into()))?;

        let system = role.system_prompt();
        let body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        debug!(role = role.key, model = %self.config.model, "invoking reasoning backend");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| match UpstreamError::from(e) {
                UpstreamError::Timeout { .. } => UpstreamError::Timeout {
                    secs: self.config.timeout_secs,
                },
                other => other,
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(UpstreamError::RateLimited { retry_after });
        }
        if status >= 400 {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "(no body)".to_string());
            return Err(UpstreamError::Status { status, message });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(format!("failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| UpstreamError::InvalidResponse("response has no choices".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::roles::CRITIC_ROLE;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> Config {
        Config {
            base_url: server.uri(),
            api_key: Some("test-key".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = OpenAiClient::new(Config {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..Config::default()
        })
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_not_configured() {
        let client = OpenAiClient::new(Config {
            api_key: None,
            ..Config::default()
        })
        .unwrap();
        let err = client.invoke(&CRITIC_ROLE, "hola").await.unwrap_err();
        assert!(matches!(err, UpstreamError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_invoke_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "CODE02 aprobado"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::new(config_for(&server)).unwrap();
        let text = client.invoke(&CRITIC_ROLE, "analiza").await.unwrap();
        assert_eq!(text, "CODE02 aprobado");
    }

    #[tokio::test]
    async fn test_error_status_maps_to_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(config_for(&server)).unwrap();
        let err = client.invoke(&CRITIC_ROLE, "analiza").await.unwrap_err();
        assert_eq!(
            err,
            UpstreamError::Status {
                status: 500,
                message: "internal".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "12"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(config_for(&server)).unwrap();
        let err = client.invoke(&CRITIC_ROLE, "analiza").await.unwrap_err();
        assert_eq!(
            err,
            UpstreamError::RateLimited {
                retry_after: Some(12)
            }
        );
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let client = OpenAiClient::new(config_for(&server)).unwrap();
        let err = client.invoke(&CRITIC_ROLE, "analiza").await.unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidResponse(_)));
    }
}
