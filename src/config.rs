use crate::error::{PipelineError, PipelineResult};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub speech: SpeechConfig,
    pub generation: GenerationConfig,
    pub transcript: TranscriptConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Streaming speech recognizer backend settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// WebSocket endpoint of the streaming recognition service
    pub endpoint: String,
    pub api_key: String,
    /// BCP-47 code the session defaults to (e.g. "en-IN")
    pub primary_language: String,
    /// Up to two alternate codes for per-utterance auto-detection
    #[serde(default)]
    pub alternate_languages: Vec<String>,
    pub sample_rate: u32,
    /// Audio encoding negotiated with the client (e.g. "LINEAR16")
    pub encoding: String,
}

/// Structured generation backend settings (report synthesis + translation).
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub api_key: String,
    pub model: String,
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptConfig {
    /// Accumulated words between durable snapshot flushes
    #[serde(default = "default_flush_threshold_words")]
    pub flush_threshold_words: usize,
}

fn default_generation_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_flush_threshold_words() -> usize {
    50
}

impl Config {
    pub fn load(path: &str) -> PipelineResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))
    }
}
