use anyhow::{Context, Result};
use clap::Parser;
use clinic_scribe::config::Config;
use clinic_scribe::http::{create_router, AppState};
use clinic_scribe::recognizer::CloudSpeechClient;
use clinic_scribe::report::{GeminiClient, ReportSynthesizer};
use clinic_scribe::transcript::InMemoryTranscriptStore;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "clinic-scribe")]
#[command(about = "Real-time clinical consultation transcription service")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(short, long, default_value = "config/clinic-scribe")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = Arc::new(
        Config::load(&args.config)
            .with_context(|| format!("Failed to load config from {}", args.config))?,
    );

    info!(service = %config.service.name, "Starting clinic-scribe");

    let speech_backend = Arc::new(CloudSpeechClient::new(&config.speech));
    let generation_backend =
        Arc::new(GeminiClient::new(&config.generation).context("Failed to build generation client")?);
    let synthesizer = Arc::new(ReportSynthesizer::new(generation_backend));
    let store = Arc::new(InMemoryTranscriptStore::new());

    let state = AppState::new(config.clone(), speech_backend, synthesizer, store);
    let router = create_router(state);

    let addr = format!("{}:{}", config.service.http.bind, config.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(addr = %addr, "HTTP server listening");
    axum::serve(listener, router)
        .await
        .context("HTTP server error")?;

    Ok(())
}
