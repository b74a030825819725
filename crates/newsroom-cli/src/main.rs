//! Newsroom CLI
//!
//! Drives the news generation pipeline and its backends from the terminal.
//!
//! ## Commands
//!
//! - `generate`: Run the full pipeline for one topic
//! - `classify`: Classify a critique text with the quality gate
//! - `sources`: Search the news backend
//! - `extract`: Fetch the full content of an article URL
//! - `health`: Check the news backend

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use newsroom_core::telemetry::{init_tracing, level_for_verbosity};
use newsroom_core::{
    format_articles, BackendHealth, CancelHandle, CritiqueVerdict, ExtractedContent,
    GateStrategy, InformationRetriever, NewsApiClient, NewsRequest, NewsroomConfig, OpenAiClient,
    PipelineOrchestrator, PipelineResult, PipelineRun, QualityGate, SearchOutcome, SourcePolicy,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "newsroom")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-stage news generation pipeline", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "NEWSROOM_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an article for a topic
    Generate {
        /// Free-text news request
        topic: String,

        /// Critique budget (default from config)
        #[arg(short, long)]
        max_iterations: Option<u32>,

        /// Quality threshold in [0, 1] (default from config)
        #[arg(short, long)]
        quality_threshold: Option<f64>,

        /// Skip the news backend even if enabled in config
        #[arg(long)]
        no_sources: bool,

        /// Print the full run record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a critique as CODE01/CODE02
    Classify {
        /// Gate strategy: keyword, always_approve or strict
        #[arg(short, long, default_value = "keyword")]
        strategy: GateStrategy,

        /// Critique text (read from stdin if omitted)
        text: Option<String>,
    },

    /// Search the news backend
    Sources {
        query: String,

        /// Interest filter (repeatable)
        #[arg(short, long = "interest")]
        interests: Vec<String>,

        /// Query every configured provider instead of the ranked search
        #[arg(long)]
        aggregate: bool,
    },

    /// Extract the full content of an article
    Extract { url: String },

    /// Check the news backend
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.json_logs, level_for_verbosity(cli.verbose));

    let config_path = cli.config;
    let load_config = || {
        NewsroomConfig::load(config_path.as_deref()).context("Failed to load configuration")
    };

    match cli.command {
        Commands::Generate {
            topic,
            max_iterations,
            quality_threshold,
            no_sources,
            json,
        } => {
            let config = load_config()?;
            let request = NewsRequest::with_options(
                topic,
                Some(max_iterations.unwrap_or(config.pipeline.default_max_iterations)),
                Some(quality_threshold.unwrap_or(config.pipeline.default_quality_threshold)),
            )
            .context("Invalid request")?;
            let orchestrator = build_orchestrator(&config, !no_sources)?;
            cmd_generate(&orchestrator, &request, json).await
        }
        Commands::Classify { strategy, text } => {
            let text = match text {
                Some(t) => t,
                None => read_stdin()?,
            };
            println!("{}", render_verdict(&QualityGate::new(strategy).classify(&text)));
            Ok(())
        }
        Commands::Sources {
            query,
            interests,
            aggregate,
        } => {
            let client = news_client(&load_config()?)?;
            let outcome = if aggregate {
                client.aggregate(&query).await
            } else {
                client.search(&query, &interests).await
            };
            println!("{}", render_sources(&outcome)?);
            Ok(())
        }
        Commands::Extract { url } => {
            let content = news_client(&load_config()?)?
                .extract(&url)
                .await
                .with_context(|| format!("Failed to extract {url}"))?;
            println!("{}", render_extracted(&content));
            Ok(())
        }
        Commands::Health => {
            let client = news_client(&load_config()?)?;
            let health = client
                .health()
                .await
                .with_context(|| format!("News backend at {} is unavailable", client.base_url()))?;
            println!("{}", render_health(&health));
            Ok(())
        }
    }
}

fn build_orchestrator(config: &NewsroomConfig, use_sources: bool) -> Result<PipelineOrchestrator> {
    if config.reasoning.api_key.is_none() {
        warn!("NEWSROOM_REASONING_API_KEY (or OPENAI_API_KEY) is not set");
    }
    let reasoning = OpenAiClient::new(config.reasoning.clone())
        .context("Failed to build reasoning client")?;
    let orchestrator = PipelineOrchestrator::new(Arc::new(reasoning), config.pipeline.clone());

    if use_sources && config.retrieval.enabled {
        let retriever: Arc<dyn InformationRetriever> = Arc::new(news_client(config)?);
        Ok(orchestrator.with_retriever(retriever, SourcePolicy::from(&config.retrieval)))
    } else {
        Ok(orchestrator)
    }
}

fn news_client(config: &NewsroomConfig) -> Result<NewsApiClient> {
    NewsApiClient::new(&config.retrieval).context("Failed to build news backend client")
}

/// Run the pipeline; Ctrl+C cancels the in-flight run.
async fn cmd_generate(
    orchestrator: &PipelineOrchestrator,
    request: &NewsRequest,
    json: bool,
) -> Result<()> {
    let cancel = CancelHandle::new();
    let on_interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling run");
            on_interrupt.cancel();
        }
    });

    let run = orchestrator
        .run_with_cancel(request, cancel.signal())
        .await;
    watcher.abort();

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        println!("{}", render_run(&run));
    }

    match &run.result {
        PipelineResult::Failure { error, .. } => Err(anyhow!("Generation failed: {error}")),
        _ => Ok(()),
    }
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read critique from stdin")?;
    Ok(text)
}

fn render_run(run: &PipelineRun) -> String {
    let mut out = format!("Run:      {}\nTopic:    {}\n", run.run_id, run.topic);
    out.push_str(&format!(
        "Calls:    {} in {} ms\n",
        run.stage_calls.len(),
        run.duration_ms()
    ));
    match &run.result {
        PipelineResult::Success {
            article,
            iterations_used,
            final_code,
            ..
        } => {
            out.push_str(&format!(
                "Outcome:  success ({final_code} after {iterations_used} critique(s))\n\n"
            ));
            out.push_str(article.html());
        }
        PipelineResult::QualityExhausted {
            last_report,
            last_verdict,
            iterations_used,
            ..
        } => {
            out.push_str(&format!(
                "Outcome:  quality not reached after {iterations_used} critique(s)\n\n"
            ));
            out.push_str("Last report:\n");
            out.push_str(last_report);
            out.push_str("\n\nLast critique:\n");
            out.push_str(&last_verdict.text);
        }
        PipelineResult::Failure { stage, error } => {
            let stage = stage.map(|s| s.to_string()).unwrap_or_else(|| "run".to_string());
            out.push_str(&format!("Outcome:  failed at {stage}: {error}"));
        }
    }
    out
}

fn render_verdict(verdict: &CritiqueVerdict) -> String {
    format!("{} ({:?})", verdict.code, verdict.basis)
}

fn render_sources(outcome: &SearchOutcome) -> Result<String> {
    if !outcome.success {
        bail!(
            "Search failed: {}",
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(format_articles(&outcome.articles))
}

fn render_extracted(content: &ExtractedContent) -> String {
    format!(
        "URL: {}\nLength: {}\n\n{}",
        content.url, content.content_length, content.content
    )
}

fn render_health(health: &BackendHealth) -> String {
    format!(
        "Status: {}\n{}",
        health.status.as_deref().unwrap_or("unknown"),
        health.message
    )
}
