use serde::Deserialize;

/// The generation output contract: a single JSON object with exactly these
/// keys.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportJson {
    pub report: String,
    pub confidence_score: f32,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

/// Three-way classification of a generation response body. The backend is
/// supposed to return JSON but is not guaranteed to; each tag has its own
/// downstream branch.
#[derive(Debug)]
pub enum GenerationPayload {
    /// Parsed directly
    ParsedJson(ReportJson),
    /// Parsed after stripping a markdown code fence
    FencedJson(ReportJson),
    /// Not JSON at all; the raw text is still used, degraded
    Unparseable(String),
}

/// If the text is wrapped in a markdown code fence (``` or ```json), return
/// the inner content.
pub fn strip_code_fence(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let rest = trimmed.strip_prefix("```")?;
    // Drop an optional language tag on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    let inner = rest.strip_suffix("```")?;
    Some(inner.trim())
}

/// Classify a raw generation response body.
pub fn classify_payload(raw: &str) -> GenerationPayload {
    if let Ok(parsed) = serde_json::from_str::<ReportJson>(raw.trim()) {
        return GenerationPayload::ParsedJson(parsed);
    }

    if let Some(inner) = strip_code_fence(raw) {
        if let Ok(parsed) = serde_json::from_str::<ReportJson>(inner) {
            return GenerationPayload::FencedJson(parsed);
        }
    }

    GenerationPayload::Unparseable(raw.to_string())
}
