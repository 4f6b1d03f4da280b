//! # parley-agent
//!
//! Parley chat service binary — loads settings, wires the pipeline to the
//! HTTP server, and runs until interrupted.

#![deny(unsafe_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use parley_core::logging::{self, LogFormat};
use parley_llm::openai::{OpenAiClient, OpenAiConfig};
use parley_llm::{ModelClient, ResponseCache};
use parley_pipeline::ChatPipeline;
use parley_server::{AppState, ConversationStore, metrics, router};
use parley_settings::types::SinkKind;
use parley_telemetry::{LogSink, NoopSink, TelemetrySink};

/// Parley chat server.
#[derive(Parser, Debug)]
#[command(name = "parley", about = "Instrumented chat service", version)]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the settings file (default `~/.parley/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Disable the Prometheus `/metrics` endpoint.
    #[arg(long)]
    no_metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings_path = args
        .settings
        .unwrap_or_else(parley_settings::loader::settings_path);
    parley_settings::reload_settings_from_path(&settings_path);
    let settings = parley_settings::get_settings();

    let format = if settings.telemetry.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    logging::init(format);

    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY must be set (the model API key is env-only)")?;

    let client: Arc<dyn ModelClient> = Arc::new(
        OpenAiClient::new(OpenAiConfig {
            api_key,
            model: settings.model.model.clone(),
            temperature: settings.model.temperature,
            base_url: settings.model.base_url.clone(),
            timeout: Some(Duration::from_millis(settings.model.timeout_ms)),
        })
        .context("failed to build model client")?,
    );

    let sink: Arc<dyn TelemetrySink> = match settings.telemetry.sink {
        SinkKind::Log => Arc::new(LogSink),
        SinkKind::None => Arc::new(NoopSink),
    };

    let pipeline = Arc::new(ChatPipeline::new(
        client,
        Arc::new(ResponseCache::new()),
        sink.clone(),
    ));
    let store = Arc::new(ConversationStore::new());

    let mut state = AppState::new(pipeline, store, sink, settings.name.clone());
    if !args.no_metrics {
        state = state.with_metrics(metrics::install_recorder());
    }
    let app = router(state);

    let host = args.host.unwrap_or_else(|| settings.server.host.clone());
    let port = args.port.unwrap_or(settings.server.port);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address {host}:{port}"))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local_addr = listener.local_addr()?;
    info!(
        addr = %local_addr,
        model = %settings.model.model,
        sink = ?settings.telemetry.sink,
        "parley server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("parley server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
