//! Single-shot speech recognition seam

use std::fmt;

use async_trait::async_trait;

use crate::Result;

/// Why a recognition attempt produced no text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatchReason {
    /// Speech was heard but could not be recognized
    NotRecognized,
    /// Nothing but silence before the timeout
    InitialSilenceTimeout,
    /// Only noise before the timeout
    InitialBabbleTimeout,
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotRecognized => "NotRecognized",
            Self::InitialSilenceTimeout => "InitialSilenceTimeout",
            Self::InitialBabbleTimeout => "InitialBabbleTimeout",
        };
        write!(f, "NoMatchDetails(reason={name})")
    }
}

/// Why a recognition attempt was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    /// The device, transport, or service failed
    Error,
    /// The audio source stopped delivering samples
    EndOfStream,
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("CancellationReason.Error"),
            Self::EndOfStream => f.write_str("CancellationReason.EndOfStream"),
        }
    }
}

/// Outcome reported by a recognition engine for one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionResult {
    /// Speech turned into text
    RecognizedSpeech {
        /// Transcript
        text: String,
    },
    /// Audio was processed but yielded no text
    NoMatch {
        /// Reason for the miss
        reason: NoMatchReason,
    },
    /// The attempt was abandoned
    Canceled {
        /// Reason for the cancellation
        reason: CancellationReason,
        /// Engine error text, present when `reason` is [`CancellationReason::Error`]
        error_details: Option<String>,
    },
}

impl RecognitionResult {
    /// Cancellation caused by an engine error
    #[must_use]
    pub fn error(details: impl Into<String>) -> Self {
        Self::Canceled {
            reason: CancellationReason::Error,
            error_details: Some(details.into()),
        }
    }
}

/// A recognition engine that turns one utterance into a result
///
/// Failures are reported in-band as [`RecognitionResult::Canceled`], so
/// this never errors. Not `Send`: microphone streams are tied to the
/// thread that opened them.
#[async_trait(?Send)]
pub trait Recognizer {
    /// Listen for a single utterance and recognize it
    async fn recognize_once(&mut self) -> RecognitionResult;
}

/// Audio captured for one recognition attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Recording {
    /// 16 kHz mono samples containing speech
    Speech(Vec<f32>),
    /// No speech before the initial-silence timeout
    InitialSilence,
    /// The source stopped producing audio
    EndOfStream,
}

/// A source of single utterances (the microphone in production)
#[async_trait(?Send)]
pub trait AudioSource {
    /// Record one utterance
    ///
    /// # Errors
    ///
    /// Returns error if the audio device cannot be opened or started
    async fn record_utterance(&mut self) -> Result<Recording>;
}
