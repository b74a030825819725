//! Server instance management

use std::sync::Arc;
use std::time::Duration;

use newsroom_core::{
    ConfigError, InformationRetriever, NewsApiClient, NewsAssistant, NewsroomConfig, OpenAiClient,
    PipelineOrchestrator, ReasoningClient, SourcePolicy, UpstreamError,
};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use crate::handlers::{app, AppState};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build client: {0}")]
    Client(#[from] UpstreamError),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// HTTP front for the newsroom pipeline.
///
/// Owns the shared state; `start` serves until Ctrl+C or SIGTERM.
pub struct NewsroomServer {
    config: NewsroomConfig,
    state: AppState,
}

impl NewsroomServer {
    /// Build the reasoning and retrieval clients described by `config`.
    pub fn new(config: NewsroomConfig) -> Result<Self, ServerError> {
        config.validate()?;

        let reasoning: Arc<dyn ReasoningClient> =
            Arc::new(OpenAiClient::new(config.reasoning.clone())?);
        let stage_timeout = Duration::from_secs(config.pipeline.stage_timeout_secs);

        let mut orchestrator =
            PipelineOrchestrator::new(Arc::clone(&reasoning), config.pipeline.clone());
        if config.retrieval.enabled {
            let retriever: Arc<dyn InformationRetriever> =
                Arc::new(NewsApiClient::new(&config.retrieval)?);
            orchestrator =
                orchestrator.with_retriever(retriever, SourcePolicy::from(&config.retrieval));
        }

        let assistant = NewsAssistant::new(reasoning, stage_timeout);
        let state = AppState::new(orchestrator, assistant);
        Ok(Self::with_state(config, state))
    }

    /// Serve pre-built state (used with fake clients).
    pub fn with_state(config: NewsroomConfig, state: AppState) -> Self {
        Self { config, state }
    }

    #[must_use]
    pub fn server_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.server.host, self.config.server.port
        )
    }

    pub async fn start(&self) -> Result<(), ServerError> {
        let router = app(self.state.clone());
        let listener = bind_listener(&self.config.server.host, self.config.server.port).await?;

        info!("Server listening on: {}", self.server_url());

        axum::serve(listener, router)
            .with_graceful_shutdown(wait_for_shutdown())
            .await
            .map_err(ServerError::Serve)?;

        info!("Server stopped");
        Ok(())
    }
}

/// Bind `host:port`, resolving host names such as `localhost`.
pub async fn bind_listener(host: &str, port: u16) -> Result<TcpListener, ServerError> {
    TcpListener::bind((host, port)).await.map_err(|e| {
        error!("Failed to bind to {}:{}: {:?}", host, port, e);
        ServerError::Bind {
            addr: format!("{host}:{port}"),
            source: e,
        }
    })
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A handler that fails to install is logged and never fires.
pub async fn wait_for_shutdown() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix;
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received TERM signal");
            }
            Err(e) => {
                warn!("Failed to install TERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_default_config() {
        let server = NewsroomServer::new(NewsroomConfig::default()).unwrap();
        assert_eq!(server.server_url(), "http://0.0.0.0:8000");
    }

    #[tokio::test]
    async fn test_bind_resolves_host_names() {
        let listener = bind_listener("localhost", 0).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[tokio::test]
    async fn test_bind_rejects_bad_host() {
        let err = bind_listener("not a host", 0).await.unwrap_err();
        match err {
            ServerError::Bind { addr, .. } => assert_eq!(addr, "not a host:0"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = NewsroomConfig::default();
        config.server.port = 0;
        assert!(matches!(
            NewsroomServer::new(config),
            Err(ServerError::Config(_))
        ));
    }
}
