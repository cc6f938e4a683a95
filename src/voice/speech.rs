//! Speech capture: one microphone utterance in, one [`Utterance`] out

use std::io::Write;

use super::azure::{AzureRecognizer, AzureSpeechClient};
use super::endpoint::ListenConfig;
use super::microphone::Microphone;
use super::recognizer::{CancellationReason, RecognitionResult, Recognizer};
use crate::Result;
use crate::config::SpeechConfig;

/// Kind of outcome an utterance carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Speech became text
    Recognized,
    /// No usable input
    NoMatch,
    /// Recognition was abandoned
    Canceled,
}

/// Outcome of one capture call
///
/// Text exists only on the `Recognized` variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Utterance {
    /// Speech turned into text
    Recognized {
        /// Transcript
        text: String,
    },
    /// Nothing usable was heard
    NoMatch {
        /// Human-readable detail
        diagnostic: String,
    },
    /// Recognition was abandoned
    Canceled {
        /// Cancellation reason
        diagnostic: String,
        /// Engine error text when the reason was an error
        error_details: Option<String>,
    },
}

impl Utterance {
    /// Outcome tag
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        match self {
            Self::Recognized { .. } => Outcome::Recognized,
            Self::NoMatch { .. } => Outcome::NoMatch,
            Self::Canceled { .. } => Outcome::Canceled,
        }
    }

    /// Transcript, if recognized
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Recognized { text } => Some(text),
            Self::NoMatch { .. } | Self::Canceled { .. } => None,
        }
    }

    /// Diagnostic detail, if not recognized
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Recognized { .. } => None,
            Self::NoMatch { diagnostic } | Self::Canceled { diagnostic, .. } => Some(diagnostic),
        }
    }
}

impl From<RecognitionResult> for Utterance {
    fn from(result: RecognitionResult) -> Self {
        match result {
            RecognitionResult::RecognizedSpeech { text } => Self::Recognized { text },
            RecognitionResult::NoMatch { reason } => Self::NoMatch {
                diagnostic: reason.to_string(),
            },
            RecognitionResult::Canceled {
                reason,
                error_details,
            } => Self::Canceled {
                diagnostic: reason.to_string(),
                error_details: error_details.filter(|_| reason == CancellationReason::Error),
            },
        }
    }
}

/// Wraps a recognizer and reports progress on the console
pub struct SpeechCapture<R> {
    recognizer: R,
}

impl SpeechCapture<AzureRecognizer<Microphone>> {
    /// Build the production pipeline: default microphone into Azure Speech
    ///
    /// # Errors
    ///
    /// Returns error if the speech client cannot be configured
    pub fn from_config(speech: SpeechConfig, listen: ListenConfig) -> Result<Self> {
        let client = AzureSpeechClient::new(speech)?;
        Ok(Self::new(AzureRecognizer::new(Microphone::new(listen), client)))
    }
}

impl<R: Recognizer> SpeechCapture<R> {
    /// Wrap an existing recognizer
    #[must_use]
    pub const fn new(recognizer: R) -> Self {
        Self { recognizer }
    }

    /// Capture and recognize one utterance
    ///
    /// Recognition failures are folded into the returned [`Utterance`].
    ///
    /// # Errors
    ///
    /// Returns error only if writing to `out` fails
    pub async fn capture<W: Write>(&mut self, out: &mut W) -> Result<Utterance> {
        writeln!(out, "Speak into your microphone...")?;
        out.flush()?;

        let utterance = Utterance::from(self.recognizer.recognize_once().await);

        match &utterance {
            Utterance::Recognized { text } => {
                tracing::info!(transcript = %text, "speech recognized");
                writeln!(out, "Recognized: {text}")?;
            }
            Utterance::NoMatch { diagnostic } => {
                tracing::info!(%diagnostic, "no speech recognized");
                writeln!(out, "No speech could be recognized: {diagnostic}")?;
            }
            Utterance::Canceled {
                diagnostic,
                error_details,
            } => {
                tracing::warn!(%diagnostic, ?error_details, "speech recognition canceled");
                writeln!(out, "Speech Recognition canceled: {diagnostic}")?;
                if let Some(details) = error_details {
                    writeln!(out, "Error details: {details}")?;
                }
            }
        }

        Ok(utterance)
    }
}
