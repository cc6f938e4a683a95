//! Voice input
//!
//! Microphone capture and resampling, utterance endpointing, and speech recognition via
//! Azure Speech, surfaced to the loop as one [`Utterance`] per call.

mod azure;
mod capture;
mod endpoint;
mod microphone;
mod recognizer;
mod resample;
mod speech;

pub use azure::{AzureRecognizer, AzureSpeechClient};
pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use endpoint::{
    DetectorEvent, DetectorState, ListenConfig, MAX_LISTEN_DURATION, UtteranceDetector, rms,
};
pub use microphone::{Microphone, SampleStream, listen_for_utterance};
pub use recognizer::{
    AudioSource, CancellationReason, NoMatchReason, RecognitionResult, Recognizer, Recording,
};
pub use resample::{StreamResampler, downmix};
pub use speech::{Outcome, SpeechCapture, Utterance};
