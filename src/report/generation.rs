use crate::config::GenerationConfig;
use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// One generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    /// Enforce a JSON response contract on the backend
    pub json_output: bool,
}

/// What the backend produced. `Blocked` (zero candidates/parts) is a normal
/// outcome here, never an error: the synthesizer maps it to the template
/// fallback.
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    Text(String),
    Blocked,
}

/// Structured-output-capable generation backend. Network/auth failures are
/// the only errors; content decisions come back as outcomes.
#[async_trait::async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> PipelineResult<GenerationOutcome>;
}

// ---------------------------------------------------------------------------
// Gemini wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GeminiGenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

// Clinical language about self-harm, substances, etc. is legitimate domain
// content; every harm category runs at the most permissive threshold.
const HARM_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

fn permissive_safety_settings() -> Vec<SafetySetting> {
    HARM_CATEGORIES
        .iter()
        .map(|category| SafetySetting {
            category,
            threshold: "BLOCK_NONE",
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// Generation backend client for the Gemini `generateContent` API.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(cfg: &GenerationConfig) -> PipelineResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PipelineError::GenerationService(e.to_string()))?;

        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> PipelineResult<GenerationOutcome> {
        let body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: request.prompt,
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                top_p: request.top_p,
                top_k: request.top_k,
                response_mime_type: request
                    .json_output
                    .then(|| "application/json".to_string()),
                max_output_tokens: Some(8192),
            },
            safety_settings: permissive_safety_settings(),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        debug!(model = %self.model, json_output = request.json_output, "Calling generation backend");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::GenerationService(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PipelineError::GenerationService(format!(
                "backend returned {status}: {text}"
            )));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::GenerationService(e.to_string()))?;

        if let Some(feedback) = &parsed.prompt_feedback {
            if let Some(reason) = &feedback.block_reason {
                info!(reason = %reason, "Generation prompt blocked");
                return Ok(GenerationOutcome::Blocked);
            }
        }

        let candidate = match parsed.candidates.and_then(|c| c.into_iter().next()) {
            Some(c) => c,
            None => {
                info!("Generation returned zero candidates");
                return Ok(GenerationOutcome::Blocked);
            }
        };

        if let Some(reason) = &candidate.finish_reason {
            if reason == "SAFETY" {
                info!("Generation candidate stopped for safety");
                return Ok(GenerationOutcome::Blocked);
            }
        }

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            warn!("Generation candidate had no text parts");
            return Ok(GenerationOutcome::Blocked);
        }

        Ok(GenerationOutcome::Text(text))
    }
}
