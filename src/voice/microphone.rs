//! Default-microphone utterance source

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::capture::AudioCapture;
use super::endpoint::{DetectorEvent, ListenConfig, UtteranceDetector};
use super::recognizer::{AudioSource, Recording};
use crate::Result;

/// How often captured audio is drained into the detector
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Time without any samples after which the device is considered gone
const STALL_TIMEOUT: Duration = Duration::from_secs(2);

/// A running source of 16 kHz mono samples
pub trait SampleStream {
    /// Drain samples delivered since the last call; empty if none arrived
    ///
    /// # Errors
    ///
    /// Returns error if captured audio cannot be converted
    fn take_samples(&mut self) -> Result<Vec<f32>>;
}

impl SampleStream for AudioCapture {
    fn take_samples(&mut self) -> Result<Vec<f32>> {
        self.take_buffer()
    }
}

/// Poll `stream` until the detector settles on one utterance
///
/// Ends with [`Recording::EndOfStream`] once the stream has delivered
/// nothing for two seconds, or once the detector's own limits have been
/// overrun.
///
/// # Errors
///
/// Returns error if the stream fails
pub async fn listen_for_utterance<S: SampleStream>(
    stream: &mut S,
    listen: &ListenConfig,
) -> Result<Recording> {
    let mut detector = UtteranceDetector::new(listen);
    let deadline = listen.initial_silence + listen.max_utterance + STALL_TIMEOUT;
    let started = Instant::now();
    let mut last_audio = started;

    loop {
        tokio::time::sleep(POLL_INTERVAL).await;

        let chunk = stream.take_samples()?;
        if chunk.is_empty() {
            if last_audio.elapsed() >= STALL_TIMEOUT {
                tracing::warn!(
                    silent_for = ?last_audio.elapsed(),
                    buffered = detector.buffered(),
                    "microphone stopped delivering audio"
                );
                return Ok(Recording::EndOfStream);
            }
            continue;
        }
        last_audio = Instant::now();

        match detector.process(&chunk) {
            DetectorEvent::Pending => {}
            DetectorEvent::Complete => return Ok(Recording::Speech(detector.take_utterance())),
            DetectorEvent::InitialSilenceTimeout => return Ok(Recording::InitialSilence),
        }

        if started.elapsed() > deadline {
            tracing::warn!(elapsed = ?started.elapsed(), "utterance overran its limits");
            return Ok(Recording::EndOfStream);
        }
    }
}

/// Records single utterances from the default input device
///
/// The device is opened fresh for every utterance and released as soon as
/// the utterance ends.
pub struct Microphone {
    listen: ListenConfig,
}

impl Microphone {
    /// Create a microphone source with the given endpointing thresholds
    #[must_use]
    pub const fn new(listen: ListenConfig) -> Self {
        Self { listen }
    }
}

#[async_trait(?Send)]
impl AudioSource for Microphone {
    async fn record_utterance(&mut self) -> Result<Recording> {
        let mut capture = AudioCapture::new()?;
        capture.start()?;

        let recording = listen_for_utterance(&mut capture, &self.listen).await;
        capture.stop();
        recording
    }
}
