//! Shared test utilities

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use parley::voice::{
    AudioSource, CancellationReason, NoMatchReason, RecognitionResult, Recognizer, Recording,
    SampleStream,
};
use parley::{Error, ResponseGenerator, Result};

/// Recognizer that replays a fixed list of results
pub struct ScriptedRecognizer {
    results: VecDeque<RecognitionResult>,
}

impl ScriptedRecognizer {
    pub fn new(results: Vec<RecognitionResult>) -> Self {
        Self {
            results: results.into(),
        }
    }
}

#[async_trait(?Send)]
impl Recognizer for ScriptedRecognizer {
    async fn recognize_once(&mut self) -> RecognitionResult {
        self.results
            .pop_front()
            .unwrap_or(RecognitionResult::Canceled {
                reason: CancellationReason::EndOfStream,
                error_details: None,
            })
    }
}

/// Generator that records prompts and returns a canned reply
pub struct StubGenerator {
    reply: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl StubGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle for inspecting prompts after the generator has been moved
    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

#[async_trait]
impl ResponseGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| Error::Llm("OpenAI API error 503 Service Unavailable".to_string()))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Audio source that hands back a fixed recording
pub struct FixedSource {
    recording: Option<Recording>,
}

impl FixedSource {
    pub fn new(recording: Recording) -> Self {
        Self {
            recording: Some(recording),
        }
    }

    /// A source whose device cannot be opened
    pub fn broken() -> Self {
        Self { recording: None }
    }
}

#[async_trait(?Send)]
impl AudioSource for FixedSource {
    async fn record_utterance(&mut self) -> Result<Recording> {
        self.recording
            .clone()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))
    }
}

/// Sample stream that delivers one scripted chunk per poll, then nothing
pub struct ChunkStream {
    chunks: VecDeque<Vec<f32>>,
    polls: usize,
}

impl ChunkStream {
    /// Split `samples` into 100ms chunks, one per poll
    pub fn from_samples(samples: &[f32]) -> Self {
        Self {
            chunks: samples.chunks(1600).map(<[f32]>::to_vec).collect(),
            polls: 0,
        }
    }

    pub fn polls(&self) -> usize {
        self.polls
    }
}

impl SampleStream for ChunkStream {
    fn take_samples(&mut self) -> Result<Vec<f32>> {
        self.polls += 1;
        Ok(self.chunks.pop_front().unwrap_or_default())
    }
}

pub fn recognized(text: &str) -> RecognitionResult {
    RecognitionResult::RecognizedSpeech {
        text: text.to_string(),
    }
}

pub fn no_match() -> RecognitionResult {
    RecognitionResult::NoMatch {
        reason: NoMatchReason::NotRecognized,
    }
}

/// Generate sine wave audio samples at 16kHz
pub fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let sample_rate = parley::voice::SAMPLE_RATE as f32;
    let num_samples = (sample_rate * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence at 16kHz
pub fn generate_silence(duration_secs: f32) -> Vec<f32> {
    let num_samples = (parley::voice::SAMPLE_RATE as f32 * duration_secs) as usize;
    vec![0.0; num_samples]
}
