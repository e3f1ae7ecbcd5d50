// Integration tests for the streaming recognizer
//
// A scripted speech backend stands in for the cloud service; the tests
// verify fragment mapping (first alternative only, language fallback),
// transient-versus-fatal error handling, and stream termination.

use anyhow::Result;
use clinic_scribe::error::PipelineResult;
use clinic_scribe::ingest::{AudioIngestAdapter, IngestStats, InboundFrame};
use clinic_scribe::recognizer::{
    fragment_from_result, BackendEvent, RecognitionAlternative, RecognitionConfig,
    RecognitionResult, RecognizerUpdate, SpeechBackend, StreamingRecognizer, WordInfo,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Speech backend that consumes the audio stream and replays a scripted
/// event sequence once the audio ends, like a real backend finalizing
/// pending results after end-of-audio.
struct ScriptedBackend {
    script: Mutex<VecDeque<BackendEvent>>,
}

impl ScriptedBackend {
    fn new(events: Vec<BackendEvent>) -> Self {
        Self {
            script: Mutex::new(events.into()),
        }
    }
}

#[async_trait::async_trait]
impl SpeechBackend for ScriptedBackend {
    async fn start_stream(
        &self,
        _config: RecognitionConfig,
    ) -> PipelineResult<(mpsc::Sender<Vec<u8>>, mpsc::Receiver<BackendEvent>)> {
        let (audio_tx, mut audio_rx) = mpsc::channel::<Vec<u8>>(16);
        let (event_tx, event_rx) = mpsc::channel::<BackendEvent>(16);
        let script = std::mem::take(&mut *self.script.lock().await);

        tokio::spawn(async move {
            while audio_rx.recv().await.is_some() {}
            for event in script {
                if event_tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok((audio_tx, event_rx))
    }
}

fn result(transcript: &str, is_final: bool, language: Option<&str>) -> RecognitionResult {
    RecognitionResult {
        alternatives: vec![RecognitionAlternative {
            transcript: transcript.to_string(),
            confidence: 0.9,
            words: Vec::new(),
        }],
        is_final,
        language_code: language.map(str::to_string),
    }
}

fn test_config() -> RecognitionConfig {
    RecognitionConfig {
        primary_language: "en-IN".to_string(),
        alternate_languages: vec!["hi-IN".to_string(), "mr-IN".to_string()],
        sample_rate_hertz: 16000,
        encoding: "LINEAR16".to_string(),
        interim_results: true,
        vocabulary: Vec::new(),
    }
}

/// Drive a scripted backend with one audio chunk and collect every update
/// until the stream ends.
async fn run_script(events: Vec<BackendEvent>) -> Result<Vec<RecognizerUpdate>> {
    let backend = Arc::new(ScriptedBackend::new(events));
    let recognizer = StreamingRecognizer::new(backend);

    let (tx, rx) = mpsc::channel(16);
    let (event_tx, _events) = mpsc::channel(16);
    let chunks = AudioIngestAdapter::connect(rx, event_tx, Arc::new(IngestStats::default()));

    tx.send(InboundFrame::Audio(vec![0u8; 320])).await?;
    drop(tx);

    let mut updates = recognizer.run(test_config(), chunks).await?;
    let mut collected = Vec::new();
    while let Some(update) = updates.recv().await {
        collected.push(update);
    }
    Ok(collected)
}

#[tokio::test]
async fn test_fragments_arrive_in_emission_order() -> Result<()> {
    let updates = run_script(vec![
        BackendEvent::Result(result("नींद अच्छी है", true, Some("hi-IN"))),
        BackendEvent::Result(result("medication continued", true, Some("en-IN"))),
    ])
    .await?;

    assert_eq!(updates.len(), 2);
    match &updates[0] {
        RecognizerUpdate::Fragment(f) => {
            assert_eq!(f.text, "नींद अच्छी है");
            assert_eq!(f.language_code, "hi-IN");
            assert!(f.is_final);
        }
        other => panic!("Expected fragment, got {:?}", other),
    }
    match &updates[1] {
        RecognizerUpdate::Fragment(f) => assert_eq!(f.text, "medication continued"),
        other => panic!("Expected fragment, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_missing_language_falls_back_to_primary() -> Result<()> {
    let updates = run_script(vec![BackendEvent::Result(result("hello", false, None))]).await?;

    match &updates[0] {
        RecognizerUpdate::Fragment(f) => {
            assert_eq!(f.language_code, "en-IN");
            assert!(!f.is_final);
        }
        other => panic!("Expected fragment, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_result_without_alternatives_is_dropped() -> Result<()> {
    let updates = run_script(vec![
        BackendEvent::Result(RecognitionResult {
            alternatives: Vec::new(),
            is_final: true,
            language_code: None,
        }),
        BackendEvent::Result(result("kept", true, None)),
    ])
    .await?;

    assert_eq!(updates.len(), 1, "Empty-alternative results are dropped, not yielded");
    match &updates[0] {
        RecognizerUpdate::Fragment(f) => assert_eq!(f.text, "kept"),
        other => panic!("Expected fragment, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_transient_error_does_not_interrupt_stream() -> Result<()> {
    let updates = run_script(vec![
        BackendEvent::TransientError("error 429: slow down".to_string()),
        BackendEvent::Result(result("still here", true, None)),
    ])
    .await?;

    assert_eq!(updates.len(), 1, "Transient errors are logged, not surfaced");
    assert!(matches!(&updates[0], RecognizerUpdate::Fragment(f) if f.text == "still here"));

    Ok(())
}

#[tokio::test]
async fn test_fatal_error_ends_stream_with_failed_update() -> Result<()> {
    let updates = run_script(vec![
        BackendEvent::Result(result("before failure", true, None)),
        BackendEvent::FatalError("auth error 401: bad key".to_string()),
        BackendEvent::Result(result("never delivered", true, None)),
    ])
    .await?;

    assert_eq!(updates.len(), 2, "Nothing is yielded after a fatal error");
    assert!(matches!(&updates[0], RecognizerUpdate::Fragment(f) if f.text == "before failure"));
    match &updates[1] {
        RecognizerUpdate::Failed(e) => assert!(e.contains("401")),
        other => panic!("Expected Failed, got {:?}", other),
    }

    Ok(())
}

#[test]
fn test_fragment_uses_first_alternative_only() {
    let result = RecognitionResult {
        alternatives: vec![
            RecognitionAlternative {
                transcript: "best guess".to_string(),
                confidence: 0.92,
                words: Vec::new(),
            },
            RecognitionAlternative {
                transcript: "worse guess".to_string(),
                confidence: 0.41,
                words: Vec::new(),
            },
        ],
        is_final: true,
        language_code: Some("mr-IN".to_string()),
    };

    let fragment = fragment_from_result(result, "en-IN").expect("should map");
    assert_eq!(fragment.text, "best guess");
    assert_eq!(fragment.confidence, 0.92);
    assert_eq!(fragment.language_code, "mr-IN");
}

#[test]
fn test_fragment_maps_word_timings_when_present() {
    let result = RecognitionResult {
        alternatives: vec![RecognitionAlternative {
            transcript: "hello world".to_string(),
            confidence: 0.9,
            words: vec![
                WordInfo {
                    word: "hello".to_string(),
                    start_time: 0.0,
                    end_time: 0.4,
                    confidence: 0.95,
                },
                WordInfo {
                    word: "world".to_string(),
                    start_time: 0.5,
                    end_time: 0.9,
                    confidence: 0.88,
                },
            ],
        }],
        is_final: true,
        language_code: None,
    };

    let fragment = fragment_from_result(result, "en-IN").expect("should map");
    let timings = fragment.word_timings.expect("timings should be present");
    assert_eq!(timings.len(), 2);
    assert_eq!(timings[0].word, "hello");
    assert_eq!(timings[1].end_offset_secs, 0.9);

    // No words means no timings, not an empty list.
    let bare = fragment_from_result(result_without_words(), "en-IN").expect("should map");
    assert!(bare.word_timings.is_none());
}

fn result_without_words() -> RecognitionResult {
    RecognitionResult {
        alternatives: vec![RecognitionAlternative {
            transcript: "bare".to_string(),
            confidence: 0.5,
            words: Vec::new(),
        }],
        is_final: false,
        language_code: None,
    }
}
