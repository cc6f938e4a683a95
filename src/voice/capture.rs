//! Microphone capture
//!
//! Opens the default input device in whatever layout it offers and hands
//! back 16 kHz mono `f32` samples, which is what endpointing and the speech
//! service expect.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};

use super::resample::{StreamResampler, downmix};
use crate::{Error, Result};

/// Rate of every sample this module returns (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Live capture from the default input device
///
/// The cpal callback downmixes each buffer to mono at the device rate.
/// Conversion to [`SAMPLE_RATE`] happens when the buffer is drained.
pub struct AudioCapture {
    device: Device,
    config: StreamConfig,
    format: SampleFormat,
    captured: Arc<Mutex<Vec<f32>>>,
    resampler: StreamResampler,
    stream: Option<Stream>,
}

impl AudioCapture {
    /// Open the default input device with its default configuration
    ///
    /// # Errors
    ///
    /// Returns error if there is no input device or it reports no usable
    /// configuration
    pub fn new() -> Result<Self> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

        let supported = device
            .default_input_config()
            .map_err(|e| Error::Audio(format!("input device has no usable config: {e}")))?;

        let format = supported.sample_format();
        let config = supported.config();
        let resampler = StreamResampler::new(config.sample_rate.0, SAMPLE_RATE)?;

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            device_rate = config.sample_rate.0,
            channels = config.channels,
            format = ?format,
            resampled = !resampler.is_passthrough(),
            "input device opened"
        );

        Ok(Self {
            device,
            config,
            format,
            captured: Arc::new(Mutex::new(Vec::new())),
            resampler,
            stream: None,
        })
    }

    /// Begin streaming from the device
    ///
    /// # Errors
    ///
    /// Returns error if the sample format is unsupported or the stream
    /// cannot be built or started
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream = match self.format {
            SampleFormat::F32 => self.build_stream::<f32>(),
            SampleFormat::I16 => self.build_stream::<i16>(),
            SampleFormat::U16 => self.build_stream::<u16>(),
            SampleFormat::I32 => self.build_stream::<i32>(),
            other => Err(Error::Audio(format!("unsupported sample format {other:?}"))),
        }?;

        stream
            .play()
            .map_err(|e| Error::Audio(format!("cannot start input stream: {e}")))?;
        self.stream = Some(stream);

        tracing::debug!("input stream started");
        Ok(())
    }

    fn build_stream<T>(&self) -> Result<Stream>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let captured = Arc::clone(&self.captured);
        let channels = usize::from(self.config.channels);

        self.device
            .build_input_stream(
                &self.config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    let samples: Vec<f32> = data.iter().map(|s| s.to_sample::<f32>()).collect();
                    if let Ok(mut buf) = captured.lock() {
                        buf.extend(downmix(&samples, channels));
                    }
                },
                |err| {
                    tracing::error!(error = %err, "input stream error");
                },
                None,
            )
            .map_err(|e| Error::Audio(format!("cannot build input stream: {e}")))
    }

    /// Release the device stream; buffered audio stays drainable
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("input stream stopped");
        }
    }

    /// Drain everything captured since the last call, as 16 kHz mono
    ///
    /// # Errors
    ///
    /// Returns error if resampling fails
    pub fn take_buffer(&mut self) -> Result<Vec<f32>> {
        let raw = self
            .captured
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default();
        self.resampler.process(&raw)
    }

    /// Native rate of the device, before resampling
    #[must_use]
    pub const fn device_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Native channel count of the device, before downmixing
    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.config.channels
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Encode mono samples as a 16-bit PCM WAV file in memory
///
/// Samples outside `[-1.0, 1.0]` are clipped.
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let wav_err = |e: hound::Error| Error::Audio(format!("WAV encoding failed: {e}"));

    let mut cursor = std::io::Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(wav_err)?;
    for &sample in samples {
        #[allow(clippy::cast_possible_truncation)]
        let pcm = (sample * f32::from(i16::MAX)).clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
        writer.write_sample(pcm).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)?;

    Ok(cursor.into_inner())
}
