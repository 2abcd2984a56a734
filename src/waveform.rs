//! Waveform envelope extraction and normalization.
//!
//! Reduces a decoded audio stream to a fixed-length envelope of per-block
//! average absolute amplitudes, then rescales the envelope so its maximum
//! value is 1.0. Both steps are pure functions; the renderer consumes the
//! normalized result.

use crate::audio::DecodedAudio;

/// Number of envelope blocks the waveform is reduced to.
///
/// Every rendered image shows exactly this many petals, regardless of the
/// input length.
pub const SAMPLES: usize = 70;

/// Fixed-length sequence of per-block average absolute amplitudes.
///
/// Always [`SAMPLES`] elements long, every element >= 0. Produced by
/// [`extract`], consumed by [`normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope(Vec<f32>);

impl Envelope {
    pub fn values(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest amplitude in the envelope.
    pub fn max(&self) -> f32 {
        self.0.iter().copied().fold(0.0, f32::max)
    }
}

/// Envelope rescaled so the maximum value is 1.0.
///
/// Same length as the [`Envelope`] it was produced from, every element in
/// [0, 1]. An all-zero envelope stays all-zero (see [`normalize`]).
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEnvelope(Vec<f32>);

impl NormalizedEnvelope {
    /// Wraps pre-normalized values. Callers are expected to keep values in
    /// [0, 1]; the renderer clamps anything outside.
    pub fn from_values(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Reduces channel 0 of the decoded audio to a [`SAMPLES`]-length envelope.
///
/// The channel is split into [`SAMPLES`] equal-width blocks of
/// `floor(frames / SAMPLES)` samples each; every envelope value is the mean
/// absolute amplitude of one block. Samples past the last full block are
/// discarded. This is a plain block-mean envelope estimator, not an RMS.
///
/// Streams shorter than [`SAMPLES`] frames have no meaningful block width;
/// they produce an all-zero envelope rather than a division by zero.
pub fn extract(audio: &DecodedAudio) -> Envelope {
    let samples = audio.channel(0).unwrap_or(&[]);
    let block_size = samples.len() / SAMPLES;

    if block_size == 0 {
        tracing::warn!(
            "Stream too short for envelope extraction ({} frames < {} blocks), \
             producing a silent envelope",
            samples.len(),
            SAMPLES
        );
        return Envelope(vec![0.0; SAMPLES]);
    }

    let mut values = Vec::with_capacity(SAMPLES);
    for block in samples.chunks_exact(block_size).take(SAMPLES) {
        let sum: f32 = block.iter().map(|s| s.abs()).sum();
        values.push(sum / block_size as f32);
    }

    Envelope(values)
}

/// Rescales the envelope so its maximum value becomes exactly 1.0.
///
/// An all-zero envelope (silent input) passes through unchanged; the
/// multiplier is undefined in that case and applying it would poison the
/// renderer with NaN.
pub fn normalize(envelope: Envelope) -> NormalizedEnvelope {
    let max = envelope.max();
    if max == 0.0 {
        return NormalizedEnvelope(envelope.0);
    }

    let multiplier = max.recip();
    NormalizedEnvelope(envelope.0.into_iter().map(|v| v * multiplier).collect())
}
