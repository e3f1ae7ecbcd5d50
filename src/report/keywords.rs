//! Bilingual clinical keyword extraction
//!
//! A static mapping table keyed by clinical concept, matched
//! case-insensitively against the transcript. Used to populate report
//! keywords when the generation backend's own keyword list is unavailable
//! (degraded parse and template fallback paths).

struct KeywordEntry {
    concept: &'static str,
    surface_forms: &'static [&'static str],
}

const CLINICAL_KEYWORDS: &[KeywordEntry] = &[
    KeywordEntry {
        concept: "sleep",
        surface_forms: &["sleep", "insomnia", "neend", "नींद", "झोप", "jhop"],
    },
    KeywordEntry {
        concept: "anxiety",
        surface_forms: &["anxiety", "anxious", "ghabrahat", "घबराहट", "चिंता", "काळजी", "worry"],
    },
    KeywordEntry {
        concept: "depression",
        surface_forms: &["depression", "depressed", "udaasi", "उदासी", "अवसाद", "उदास", "low mood"],
    },
    KeywordEntry {
        concept: "panic",
        surface_forms: &["panic", "panic attack", "daura", "घबराहट का दौरा"],
    },
    KeywordEntry {
        concept: "stress",
        surface_forms: &["stress", "tension", "tanav", "तनाव", "ताण"],
    },
    KeywordEntry {
        concept: "anger",
        surface_forms: &["anger", "irritability", "gussa", "गुस्सा", "राग", "chidchidapan"],
    },
    KeywordEntry {
        concept: "fear",
        surface_forms: &["fear", "phobia", "darr", "डर", "भीती", "bhiti"],
    },
    KeywordEntry {
        concept: "fatigue",
        surface_forms: &["fatigue", "tired", "thakaan", "थकान", "थकवा", "weakness", "kamzori", "कमजोरी"],
    },
    KeywordEntry {
        concept: "appetite",
        surface_forms: &["appetite", "bhookh", "भूख", "not eating", "khana nahi"],
    },
    KeywordEntry {
        concept: "headache",
        surface_forms: &["headache", "sir dard", "सिरदर्द", "डोके दुखते", "dok dukhte"],
    },
    KeywordEntry {
        concept: "palpitations",
        surface_forms: &["palpitation", "dhadkan", "धड़कन", "धडधड", "racing heart"],
    },
    KeywordEntry {
        concept: "dizziness",
        surface_forms: &["dizzy", "dizziness", "chakkar", "चक्कर", "गरगर"],
    },
    KeywordEntry {
        concept: "concentration",
        surface_forms: &["concentration", "focus", "dhyan", "ध्यान", "man nahi lagta", "मन नहीं लगता"],
    },
    KeywordEntry {
        concept: "memory",
        surface_forms: &["memory", "forgetting", "yaaddasht", "याददाश्त", "विसरायला", "bhool"],
    },
    KeywordEntry {
        concept: "suicidal ideation",
        surface_forms: &["suicide", "suicidal", "self harm", "aatmahatya", "आत्महत्या", "marne ka khayal"],
    },
    KeywordEntry {
        concept: "hallucinations",
        surface_forms: &["hallucination", "hearing voices", "awaazein", "आवाजें", "bhram"],
    },
    KeywordEntry {
        concept: "medication",
        surface_forms: &["medication", "medicine", "tablet", "dawai", "दवाई", "दवा", "औषध", "aushadh", "dose"],
    },
    KeywordEntry {
        concept: "side effects",
        surface_forms: &["side effect", "dawa ka asar", "दवा का असर", "औषधाचा त्रास", "drowsiness", "dry mouth", "nausea"],
    },
    KeywordEntry {
        concept: "improvement",
        surface_forms: &["improved", "improvement", "better", "behtar", "बेहतर", "सुधार", "aaram", "आराम", "फरक"],
    },
    KeywordEntry {
        concept: "worsening",
        surface_forms: &["worse", "worsening", "zyada ho gaya", "बढ़ गया", "वाढले", "badh gaya"],
    },
    KeywordEntry {
        concept: "alcohol",
        surface_forms: &["alcohol", "drinking", "sharab", "शराब", "दारू", "daru"],
    },
    KeywordEntry {
        concept: "tobacco",
        surface_forms: &["tobacco", "smoking", "cigarette", "tambaku", "तंबाकू", "बीड़ी", "gutka"],
    },
    KeywordEntry {
        concept: "family",
        surface_forms: &["family", "parivaar", "परिवार", "कुटुंब", "ghar", "wife", "husband", "mother", "father"],
    },
    KeywordEntry {
        concept: "work",
        surface_forms: &["work", "job", "office", "kaam", "काम", "naukri", "नौकरी"],
    },
    KeywordEntry {
        concept: "therapy",
        surface_forms: &["therapy", "counselling", "counseling", "session", "समुपदेशन"],
    },
    KeywordEntry {
        concept: "follow up",
        surface_forms: &["follow up", "follow-up", "next visit", "agli baar", "अगली बार", "पुढच्या वेळी"],
    },
];

/// Extract up to `cap` concept keywords from a transcript, in table order
/// (extraction order), deduplicated.
pub fn extract_keywords(transcript: &str, cap: usize) -> Vec<String> {
    let haystack = transcript.to_lowercase();
    let mut keywords = Vec::new();

    for entry in CLINICAL_KEYWORDS {
        if keywords.len() >= cap {
            break;
        }
        let matched = entry
            .surface_forms
            .iter()
            .any(|form| haystack.contains(&form.to_lowercase()));
        if matched {
            keywords.push(entry.concept.to_string());
        }
    }

    keywords
}
