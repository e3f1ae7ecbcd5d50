//! Clinical report synthesis
//!
//! Turns a transcript snapshot plus session context into a structured
//! clinical report, defensively: the generation backend can block content,
//! return malformed output, or be unavailable. Every failure mode short of a
//! network/auth error degrades to a usable lower-confidence report.

mod generation;
mod keywords;
mod parse;
mod synthesizer;
mod template;

pub use generation::{GeminiClient, GenerationBackend, GenerationOutcome, GenerationRequest};
pub use keywords::extract_keywords;
pub use parse::{classify_payload, strip_code_fence, GenerationPayload, ReportJson};
pub use synthesizer::{contains_devanagari, ReportSynthesizer};
pub use template::{
    build_fallback_report, build_generation_prompt, build_translation_prompt, sections_for,
    FOLLOW_UP_SECTIONS, NEW_PATIENT_SECTIONS,
};

use serde::{Deserialize, Serialize};

/// Confidence assigned when the generation response was usable text but not
/// valid JSON (degraded AI output).
pub const DEGRADED_PARSE_CONFIDENCE: f32 = 0.5;

/// Confidence assigned to a deterministic template-fallback report.
pub const TEMPLATE_FALLBACK_CONFIDENCE: f32 = 0.65;

/// Keywords are truncated to this many entries, first-extracted first.
pub const MAX_KEYWORDS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    NewPatient,
    #[default]
    FollowUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    AiGenerated,
    TemplateFallback,
}

/// Session metadata available to the synthesizer.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub session_type: SessionType,
    pub patient_status: Option<String>,
    pub medications: Vec<String>,
}

/// The output artifact. Immutable once created; a re-synthesis produces a
/// new report.
#[derive(Debug, Clone, Serialize)]
pub struct ClinicalReport {
    pub report_markdown: String,
    /// Synthesizer-assigned; independent of transcript confidence
    pub confidence_score: f32,
    /// At most [`MAX_KEYWORDS`], deduplicated, in extraction order
    pub keywords: Vec<String>,
    pub reasoning: String,
    pub generation_method: GenerationMethod,
    pub session_type: SessionType,
}
