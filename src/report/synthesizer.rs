use super::generation::{GenerationBackend, GenerationOutcome, GenerationRequest};
use super::keywords::extract_keywords;
use super::parse::{classify_payload, GenerationPayload, ReportJson};
use super::template::{build_fallback_report, build_generation_prompt, build_translation_prompt};
use super::{
    ClinicalReport, GenerationMethod, SessionContext, DEGRADED_PARSE_CONFIDENCE, MAX_KEYWORDS,
    TEMPLATE_FALLBACK_CONFIDENCE,
};
use crate::error::PipelineResult;
use std::sync::Arc;
use tracing::{info, warn};

/// True if the text contains Devanagari script (Hindi/Marathi content that
/// benefits from translation before generation).
pub fn contains_devanagari(text: &str) -> bool {
    text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c))
}

/// Stateless report synthesizer; safe to call concurrently across sessions.
pub struct ReportSynthesizer {
    backend: Arc<dyn GenerationBackend>,
}

impl ReportSynthesizer {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Produce a clinical report from a transcript snapshot.
    ///
    /// Blocked content, malformed JSON and translation failure all degrade
    /// to a usable report; only a backend network/auth error is returned as
    /// an error.
    pub async fn synthesize(
        &self,
        transcript: &str,
        ctx: &SessionContext,
    ) -> PipelineResult<ClinicalReport> {
        let normalized = self.normalize_language(transcript).await;

        let request = GenerationRequest {
            prompt: build_generation_prompt(&normalized, ctx),
            temperature: 0.2,
            top_p: 0.95,
            top_k: 40,
            json_output: true,
        };

        match self.backend.generate(request).await? {
            GenerationOutcome::Blocked => {
                info!("Generation blocked, using template fallback");
                Ok(Self::fallback_report(&normalized, ctx))
            }
            GenerationOutcome::Text(raw) => match classify_payload(&raw) {
                GenerationPayload::ParsedJson(json) | GenerationPayload::FencedJson(json) => {
                    Ok(Self::report_from_json(json, ctx))
                }
                GenerationPayload::Unparseable(raw) => {
                    warn!("Generation response was not JSON, degrading");
                    Ok(Self::degraded_report(raw, &normalized, ctx))
                }
            },
        }
    }

    /// Step 1: language normalization. Translation is an accuracy
    /// enhancement, not a hard dependency; any failure falls back to the
    /// original transcript.
    async fn normalize_language(&self, transcript: &str) -> String {
        if !contains_devanagari(transcript) {
            return transcript.to_string();
        }

        let request = GenerationRequest {
            prompt: build_translation_prompt(transcript),
            temperature: 0.1,
            top_p: 1.0,
            top_k: 40,
            json_output: false,
        };

        match self.backend.generate(request).await {
            Ok(GenerationOutcome::Text(translated)) if !translated.trim().is_empty() => {
                info!(
                    original_chars = transcript.chars().count(),
                    translated_chars = translated.chars().count(),
                    "Transcript translated before generation"
                );
                translated
            }
            Ok(_) => {
                warn!("Translation returned no usable text, proceeding with original transcript");
                transcript.to_string()
            }
            Err(e) => {
                warn!(error = %e, "Translation failed, proceeding with original transcript");
                transcript.to_string()
            }
        }
    }

    /// Step 3b: the backend honored the contract; use it verbatim, capping
    /// keywords.
    fn report_from_json(json: ReportJson, ctx: &SessionContext) -> ClinicalReport {
        let ReportJson {
            report,
            confidence_score,
            mut keywords,
            reasoning,
        } = json;
        keywords.truncate(MAX_KEYWORDS);

        ClinicalReport {
            report_markdown: report,
            confidence_score,
            keywords,
            reasoning,
            generation_method: GenerationMethod::AiGenerated,
            session_type: ctx.session_type,
        }
    }

    /// Step 3c: still AI output, just degraded-quality. The raw text becomes
    /// the report and keywords come from the deterministic extraction pass.
    fn degraded_report(raw: String, transcript: &str, ctx: &SessionContext) -> ClinicalReport {
        ClinicalReport {
            report_markdown: raw,
            confidence_score: DEGRADED_PARSE_CONFIDENCE,
            keywords: extract_keywords(transcript, MAX_KEYWORDS),
            reasoning: "Generated report could not be parsed as structured output; \
raw text preserved."
                .to_string(),
            generation_method: GenerationMethod::AiGenerated,
            session_type: ctx.session_type,
        }
    }

    /// Step 4: deterministic template fallback. The caller always gets some
    /// usable report; in a clinical workflow "no report" is the worse
    /// failure mode.
    fn fallback_report(transcript: &str, ctx: &SessionContext) -> ClinicalReport {
        ClinicalReport {
            report_markdown: build_fallback_report(transcript, ctx),
            confidence_score: TEMPLATE_FALLBACK_CONFIDENCE,
            keywords: extract_keywords(transcript, MAX_KEYWORDS),
            reasoning: "Generation was blocked; conservative template report assembled \
from session metadata."
                .to_string(),
            generation_method: GenerationMethod::TemplateFallback,
            session_type: ctx.session_type,
        }
    }
}
