//! Layered configuration: defaults, then an optional TOML file, then
//! environment overrides.
//!
//! Only the binaries call [`NewsroomConfig::load`]. Library code receives the
//! resulting values explicitly and never reads the environment itself.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::request::{DEFAULT_MAX_ITERATIONS, DEFAULT_QUALITY_THRESHOLD};
use crate::quality_gate::GateStrategy;

/// Configuration loading or validation failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: '{value}'")]
    InvalidEnv { key: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Chat-completions backend settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for ReasoningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReasoningConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// News backend settings and source pre-fetch policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Interests forwarded with every search.
    pub interests: Vec<String>,
    /// Abort the run when the pre-fetch fails.
    pub require_sources: bool,
    /// Search again before each re-investigation.
    pub refetch_on_retry: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:3001".to_string(),
            timeout_secs: 30,
            interests: Vec::new(),
            require_sources: false,
            refetch_on_retry: true,
        }
    }
}

/// Orchestrator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub default_max_iterations: u32,
    pub default_quality_threshold: f64,
    pub gate_strategy: GateStrategy,
    /// Per-stage deadline.
    pub stage_timeout_secs: u64,
    /// Whole-run deadline. `0` disables it.
    pub run_timeout_secs: u64,
    pub validate_article: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_max_iterations: DEFAULT_MAX_ITERATIONS,
            default_quality_threshold: DEFAULT_QUALITY_THRESHOLD,
            gate_strategy: GateStrategy::Keyword,
            stage_timeout_secs: 120,
            run_timeout_secs: 600,
            validate_article: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsroomConfig {
    pub server: ServerConfig,
    pub reasoning: ReasoningConfig,
    pub retrieval: RetrievalConfig,
    pub pipeline: PipelineConfig,
}

impl NewsroomConfig {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply environment-style overrides through `lookup`.
    ///
    /// `NEWSROOM_*` keys win over the legacy `OPENAI_API_KEY`, `BACKEND_URL`
    /// and `PORT` names.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset, so they never shadow a legacy key.
        let set = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(|v| (key, v))
        };
        let get = |primary: &'static str, legacy: Option<&'static str>| {
            set(primary).or_else(|| legacy.and_then(|k| set(k)))
        };

        if let Some((_, v)) = get("NEWSROOM_HOST", None) {
            self.server.host = v;
        }
        if let Some((k, v)) = get("NEWSROOM_PORT", Some("PORT")) {
            self.server.port = parse(k, &v)?;
        }

        if let Some((_, v)) = get("NEWSROOM_REASONING_API_KEY", Some("OPENAI_API_KEY")) {
            self.reasoning.api_key = Some(v);
        }
        if let Some((_, v)) = get("NEWSROOM_REASONING_BASE_URL", None) {
            self.reasoning.base_url = v;
        }
        if let Some((_, v)) = get("NEWSROOM_REASONING_MODEL", None) {
            self.reasoning.model = v;
        }
        if let Some((k, v)) = get("NEWSROOM_REASONING_TEMPERATURE", None) {
            self.reasoning.temperature = parse(k, &v)?;
        }
        if let Some((k, v)) = get("NEWSROOM_REASONING_TIMEOUT_SECS", None) {
            self.reasoning.timeout_secs = parse(k, &v)?;
        }

        if let Some((k, v)) = get("NEWSROOM_RETRIEVAL_ENABLED", None) {
            self.retrieval.enabled = parse(k, &v)?;
        }
        if let Some((_, v)) = get("NEWSROOM_RETRIEVAL_BASE_URL", Some("BACKEND_URL")) {
            self.retrieval.base_url = v;
        }
        if let Some((_, v)) = get("NEWSROOM_RETRIEVAL_INTERESTS", None) {
            self.retrieval.interests = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some((k, v)) = get("NEWSROOM_MAX_ITERATIONS", None) {
            self.pipeline.default_max_iterations = parse(k, &v)?;
        }
        if let Some((k, v)) = get("NEWSROOM_GATE_STRATEGY", None) {
            self.pipeline.gate_strategy = v.parse().map_err(|_| ConfigError::InvalidEnv {
                key: k,
                value: v.clone(),
            })?;
        }
        if let Some((k, v)) = get("NEWSROOM_STAGE_TIMEOUT_SECS", None) {
            self.pipeline.stage_timeout_secs = parse(k, &v)?;
        }
        if let Some((k, v)) = get("NEWSROOM_RUN_TIMEOUT_SECS", None) {
            self.pipeline.run_timeout_secs = parse(k, &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host must not be empty".into()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must not be 0".into()));
        }
        if self.reasoning.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("reasoning.base_url must not be empty".into()));
        }
        if self.reasoning.timeout_secs == 0 {
            return Err(ConfigError::Invalid("reasoning.timeout_secs must be > 0".into()));
        }
        if !(0.0..=2.0).contains(&self.reasoning.temperature) {
            return Err(ConfigError::Invalid(format!(
                "reasoning.temperature must be within [0, 2], got {}",
                self.reasoning.temperature
            )));
        }
        if self.retrieval.enabled && self.retrieval.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("retrieval.base_url must not be empty".into()));
        }
        if self.retrieval.timeout_secs == 0 {
            return Err(ConfigError::Invalid("retrieval.timeout_secs must be > 0".into()));
        }
        if self.pipeline.default_max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.default_max_iterations must be >= 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.pipeline.default_quality_threshold) {
            return Err(ConfigError::Invalid(format!(
                "pipeline.default_quality_threshold must be within [0, 1], got {}",
                self.pipeline.default_quality_threshold
            )));
        }
        if self.pipeline.stage_timeout_secs == 0 {
            return Err(ConfigError::Invalid("pipeline.stage_timeout_secs must be > 0".into()));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}
