//! Utterance endpointing
//!
//! Decides, from audio energy alone, when a speaker has started and
//! finished a single utterance. Mirrors the behavior of a one-shot
//! recognizer: give up if nobody speaks, stop on trailing silence, and
//! cap the total length.

use std::time::Duration;

use super::SAMPLE_RATE;
use crate::{Error, Result};

/// Longest value accepted for any endpointing duration
pub const MAX_LISTEN_DURATION: Duration = Duration::from_secs(600);

/// Endpointing thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct ListenConfig {
    /// How long to wait for speech before reporting no match
    pub initial_silence: Duration,
    /// Trailing silence that ends an utterance
    pub end_silence: Duration,
    /// Hard cap on utterance length
    pub max_utterance: Duration,
    /// Shortest burst of energy counted as speech
    pub min_speech: Duration,
    /// RMS level above which a chunk counts as speech
    pub energy_threshold: f32,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            initial_silence: Duration::from_secs(5),
            end_silence: Duration::from_millis(800),
            max_utterance: Duration::from_secs(15),
            min_speech: Duration::from_millis(300),
            energy_threshold: 0.02,
        }
    }
}

impl ListenConfig {
    /// Check that the detector can work with these thresholds
    ///
    /// # Errors
    ///
    /// Returns error if a duration is zero or longer than
    /// [`MAX_LISTEN_DURATION`], the energy threshold is outside `[0, 1]`, or
    /// the minimum speech length exceeds the utterance cap
    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("initial_silence_ms", self.initial_silence),
            ("end_silence_ms", self.end_silence),
            ("max_utterance_ms", self.max_utterance),
            ("min_speech_ms", self.min_speech),
        ];
        for (name, value) in durations {
            if value.is_zero() || value > MAX_LISTEN_DURATION {
                return Err(Error::Config(format!(
                    "listen.{name} must be between 1 and {} ms, got {}",
                    MAX_LISTEN_DURATION.as_millis(),
                    value.as_millis()
                )));
            }
        }

        // NaN fails the range check too
        if !(0.0..=1.0).contains(&self.energy_threshold) {
            return Err(Error::Config(format!(
                "listen.energy_threshold must be within [0, 1], got {}",
                self.energy_threshold
            )));
        }

        if self.min_speech > self.max_utterance {
            return Err(Error::Config(format!(
                "listen.min_speech_ms ({}) exceeds listen.max_utterance_ms ({})",
                self.min_speech.as_millis(),
                self.max_utterance.as_millis()
            )));
        }

        Ok(())
    }
}

/// Convert a duration to a sample count at [`SAMPLE_RATE`]
#[allow(clippy::cast_possible_truncation)]
const fn samples_for(duration: Duration) -> usize {
    (duration.as_millis() as usize).saturating_mul(SAMPLE_RATE as usize) / 1000
}

/// State of the utterance detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// No speech heard yet
    Waiting,
    /// Speech heard, accumulating until trailing silence
    Speaking,
}

/// Result of feeding a chunk to the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorEvent {
    /// Keep feeding audio
    Pending,
    /// An utterance ended; take it with [`UtteranceDetector::take_utterance`]
    Complete,
    /// Nobody spoke before the initial-silence timeout
    InitialSilenceTimeout,
}

/// Energy-based single-utterance detector
pub struct UtteranceDetector {
    energy_threshold: f32,
    initial_silence: usize,
    end_silence: usize,
    max_utterance: usize,
    min_speech: usize,
    state: DetectorState,
    buffer: Vec<f32>,
    silence_counter: usize,
    waited: usize,
}

impl UtteranceDetector {
    /// Create a detector from endpointing thresholds
    #[must_use]
    pub fn new(config: &ListenConfig) -> Self {
        Self {
            energy_threshold: config.energy_threshold,
            initial_silence: samples_for(config.initial_silence),
            end_silence: samples_for(config.end_silence),
            max_utterance: samples_for(config.max_utterance),
            min_speech: samples_for(config.min_speech),
            state: DetectorState::Waiting,
            buffer: Vec::new(),
            silence_counter: 0,
            waited: 0,
        }
    }

    /// Feed a chunk of 16 kHz mono samples
    pub fn process(&mut self, samples: &[f32]) -> DetectorEvent {
        if samples.is_empty() {
            return DetectorEvent::Pending;
        }

        let energy = rms(samples);
        let is_speech = energy > self.energy_threshold;

        match self.state {
            DetectorState::Waiting => {
                if is_speech {
                    self.state = DetectorState::Speaking;
                    self.buffer.clear();
                    self.buffer.extend_from_slice(samples);
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech started");
                } else {
                    self.waited += samples.len();
                    if self.waited >= self.initial_silence {
                        tracing::debug!(waited = self.waited, "initial silence timeout");
                        return DetectorEvent::InitialSilenceTimeout;
                    }
                }
            }
            DetectorState::Speaking => {
                self.buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                tracing::trace!(
                    buffer_len = self.buffer.len(),
                    silence = self.silence_counter,
                    is_speech,
                    energy,
                    "speaking state"
                );

                if self.buffer.len() >= self.max_utterance {
                    tracing::debug!(samples = self.buffer.len(), "utterance hit length cap");
                    return DetectorEvent::Complete;
                }

                if self.silence_counter >= self.end_silence {
                    let voiced = self.buffer.len() - self.silence_counter;
                    if voiced >= self.min_speech {
                        tracing::debug!(samples = self.buffer.len(), "utterance complete");
                        return DetectorEvent::Complete;
                    }

                    // Too short to be speech: a click or a cough
                    tracing::trace!(voiced, "discarding short burst");
                    self.waited += self.buffer.len();
                    self.buffer.clear();
                    self.silence_counter = 0;
                    self.state = DetectorState::Waiting;
                }
            }
        }

        DetectorEvent::Pending
    }

    /// Take the captured utterance, leaving the detector empty
    pub fn take_utterance(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.buffer)
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> DetectorState {
        self.state
    }

    /// Samples buffered so far
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

/// Calculate RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
