//! Decoded audio representation and decoding.
//!
//! The decoder turns raw encoded bytes (WAV, MP3, FLAC) into planar
//! floating-point samples. Channels are kept separate as decoded; the
//! envelope extractor reads channel 0 only and no mixing happens anywhere.

pub mod decode;

pub use decode::{decode_bytes, DecodeError};

/// Decoded audio stream: planar per-channel samples plus the sample rate.
///
/// Samples are f32 in the nominal range [-1.0, 1.0]. Immutable once
/// produced; the pipeline discards it after envelope extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl DecodedAudio {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples of one channel, or `None` if the channel does not exist.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(|c| c.as_slice())
    }

    /// Number of frames in channel 0.
    pub fn frames(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Peak absolute amplitude of channel 0.
    pub fn peak(&self) -> f32 {
        self.channel(0)
            .unwrap_or(&[])
            .iter()
            .map(|s| s.abs())
            .fold(0.0, f32::max)
    }
}
