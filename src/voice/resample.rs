//! Channel downmixing and sample-rate conversion for captured audio

use rubato::{FftFixedIn, Resampler};

use crate::{Error, Result};

/// Nominal resampler input chunk, in frames
const CHUNK_SIZE: usize = 1024;

/// FFT sub-chunks per input chunk
const SUB_CHUNKS: usize = 2;

/// Average interleaved frames down to a single channel
///
/// A trailing partial frame is dropped.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Converts a mono stream from the device rate to a target rate
///
/// Input is held back until a full resampler chunk is available, so output
/// lags input by at most one chunk. When both rates match, samples pass
/// through untouched.
pub struct StreamResampler {
    resampler: Option<FftFixedIn<f32>>,
    pending: Vec<f32>,
}

impl StreamResampler {
    /// Create a resampler from `from_rate` to `to_rate` Hz
    ///
    /// # Errors
    ///
    /// Returns error if rubato rejects the rate pair
    pub fn new(from_rate: u32, to_rate: u32) -> Result<Self> {
        let resampler = if from_rate == to_rate {
            None
        } else {
            let inner = FftFixedIn::<f32>::new(
                from_rate as usize,
                to_rate as usize,
                CHUNK_SIZE,
                SUB_CHUNKS,
                1,
            )
            .map_err(|e| Error::Audio(format!("resampler init failed: {e}")))?;
            Some(inner)
        };

        Ok(Self {
            resampler,
            pending: Vec::new(),
        })
    }

    /// Whether samples are converted at all
    #[must_use]
    pub const fn is_passthrough(&self) -> bool {
        self.resampler.is_none()
    }

    /// Feed mono samples, returning whatever output is ready
    ///
    /// # Errors
    ///
    /// Returns error if rubato fails on a chunk
    pub fn process(&mut self, samples: &[f32]) -> Result<Vec<f32>> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(samples.to_vec());
        };

        self.pending.extend_from_slice(samples);

        let mut output = Vec::new();
        loop {
            let needed = resampler.input_frames_next();
            if self.pending.len() < needed {
                break;
            }

            let chunk: Vec<f32> = self.pending.drain(..needed).collect();
            let mut frames = resampler
                .process(&[chunk], None)
                .map_err(|e| Error::Audio(format!("resample failed: {e}")))?;
            if let Some(mono) = frames.pop() {
                output.extend(mono);
            }
        }

        Ok(output)
    }
}
