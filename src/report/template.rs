use super::{SessionContext, SessionType};

/// Report sections for a returning patient.
pub const FOLLOW_UP_SECTIONS: &[&str] = &[
    "Current Situation",
    "Mental Status",
    "Sleep & Physical",
    "Medication & Treatment",
    "Risk & Side Effects",
];

/// Report sections for a first consultation.
pub const NEW_PATIENT_SECTIONS: &[&str] = &[
    "Chief Complaint",
    "History of Present Illness",
    "Mental Status Exam",
    "Risk Assessment",
    "Provisional Assessment",
    "Treatment Plan",
];

pub fn sections_for(session_type: SessionType) -> &'static [&'static str] {
    match session_type {
        SessionType::FollowUp => FOLLOW_UP_SECTIONS,
        SessionType::NewPatient => NEW_PATIENT_SECTIONS,
    }
}

/// Prompt for the structured generation call. The output contract is a
/// single JSON object with exactly the keys `report`, `confidence_score`,
/// `keywords`, `reasoning`.
pub fn build_generation_prompt(transcript: &str, ctx: &SessionContext) -> String {
    let sections = sections_for(ctx.session_type)
        .iter()
        .map(|s| format!("## {s}"))
        .collect::<Vec<_>>()
        .join("\n");

    let visit_kind = match ctx.session_type {
        SessionType::FollowUp => "a follow-up consultation",
        SessionType::NewPatient => "a new-patient consultation",
    };

    let mut prompt = format!(
        "You are a clinical documentation assistant for a psychiatry practice. \
The transcript below was captured during {visit_kind} and may mix English, \
Hindi and Marathi. Write a concise clinical report in English markdown using \
exactly these section headers:\n\n{sections}\n\n"
    );

    if let Some(status) = &ctx.patient_status {
        prompt.push_str(&format!("Patient status: {status}\n"));
    }
    if !ctx.medications.is_empty() {
        prompt.push_str(&format!(
            "Current medications: {}\n",
            ctx.medications.join(", ")
        ));
    }

    prompt.push_str(&format!(
        "\nTranscript:\n{transcript}\n\n\
Respond with a single JSON object and nothing else, with exactly these keys:\n\
- \"report\": the markdown report string\n\
- \"confidence_score\": a float between 0 and 1 reflecting how well the transcript supports the report\n\
- \"keywords\": an array of at most 10 clinical keywords\n\
- \"reasoning\": one short sentence justifying the confidence score\n"
    ));

    prompt
}

/// Prompt for the dedicated translation (language normalization) call.
pub fn build_translation_prompt(transcript: &str) -> String {
    format!(
        "Translate the following clinical consultation transcript to English. \
It may mix Hindi, Marathi and English. Preserve clinical terminology, \
medication names and dosages exactly. Return only the translated transcript, \
no commentary.\n\n{transcript}"
    )
}

/// Deterministic minimal report used when the generation backend blocks the
/// content. Fixed section headers plus whatever session metadata exists.
pub fn build_fallback_report(transcript: &str, ctx: &SessionContext) -> String {
    let mut report = String::from("# Consultation Report (auto-generated summary)\n");

    for section in sections_for(ctx.session_type) {
        report.push_str(&format!("\n## {section}\n"));
        match *section {
            "Medication & Treatment" | "Treatment Plan" => {
                if ctx.medications.is_empty() {
                    report.push_str("To be completed by the clinician.\n");
                } else {
                    for med in &ctx.medications {
                        report.push_str(&format!("- {med}\n"));
                    }
                }
            }
            "Current Situation" | "Chief Complaint" => {
                if let Some(status) = &ctx.patient_status {
                    report.push_str(&format!("Patient status on record: {status}\n"));
                }
                report.push_str(&format!(
                    "Consultation captured {} words of transcript; \
clinician review required.\n",
                    transcript.split_whitespace().count()
                ));
            }
            _ => {
                report.push_str("To be completed by the clinician.\n");
            }
        }
    }

    report.push_str(
        "\n---\nThis summary was assembled without AI generation; \
please review the full transcript.\n",
    );

    report
}
