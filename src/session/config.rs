use crate::config::Config;
use crate::recognizer::{clinical_boost_phrases, RecognitionConfig};
use crate::report::{SessionContext, SessionType};
use serde::{Deserialize, Serialize};

/// Configuration for one transcription session, fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Opaque external identifier (e.g. "consult-2026-08-23-opd-12")
    pub session_id: String,

    pub session_type: SessionType,

    /// BCP-47 code recognition defaults to
    pub primary_language: String,

    /// Up to two alternates auto-detected per utterance (code-switching)
    pub alternate_languages: Vec<String>,

    pub sample_rate: u32,
    pub encoding: String,

    /// Accumulated words between durable transcript flushes
    pub flush_threshold_words: usize,

    /// Patient status on record, if the caller supplied it
    pub patient_status: Option<String>,

    /// Current medication list, if the caller supplied it
    pub medications: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            session_type: SessionType::FollowUp,
            primary_language: "en-IN".to_string(),
            alternate_languages: vec!["hi-IN".to_string(), "mr-IN".to_string()],
            sample_rate: 16000,
            encoding: "LINEAR16".to_string(),
            flush_threshold_words: 50,
            patient_status: None,
            medications: Vec::new(),
        }
    }
}

impl SessionConfig {
    /// Session config seeded from the service configuration.
    pub fn from_app_config(cfg: &Config, session_id: String) -> Self {
        Self {
            session_id,
            primary_language: cfg.speech.primary_language.clone(),
            alternate_languages: cfg.speech.alternate_languages.clone(),
            sample_rate: cfg.speech.sample_rate,
            encoding: cfg.speech.encoding.clone(),
            flush_threshold_words: cfg.transcript.flush_threshold_words,
            ..Self::default()
        }
    }

    pub fn recognition_config(&self) -> RecognitionConfig {
        RecognitionConfig {
            primary_language: self.primary_language.clone(),
            alternate_languages: self.alternate_languages.clone(),
            sample_rate_hertz: self.sample_rate,
            encoding: self.encoding.clone(),
            interim_results: true,
            vocabulary: clinical_boost_phrases(),
        }
    }

    pub fn context(&self) -> SessionContext {
        SessionContext {
            session_type: self.session_type,
            patient_status: self.patient_status.clone(),
            medications: self.medications.clone(),
        }
    }
}
