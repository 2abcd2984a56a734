//! Symphonia-based audio decoding.
//!
//! Decodes an in-memory byte buffer into planar f32 samples. The decoder is
//! constructed per call; there is no shared decoding context.

use std::io::Cursor;

use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use super::DecodedAudio;

/// Errors produced while decoding fetched bytes into audio samples.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("could not determine the audio format: {0}")]
    Probe(symphonia::core::errors::Error),
    #[error("no decodable audio track found in the stream")]
    NoTrack,
    #[error("unsupported codec: {0}")]
    Unsupported(symphonia::core::errors::Error),
    #[error("decoded stream contains no audio frames")]
    EmptyStream,
}

/// Decodes encoded audio bytes into a [`DecodedAudio`] stream.
///
/// The container format is probed from the bytes themselves; `extension` is
/// an optional hint (e.g. "mp3") taken from the source URL or file name.
/// Channels are de-interleaved into planar buffers without mixing.
///
/// # Errors
/// - If the format cannot be probed or contains no decodable track
/// - If no codec is registered for the track
/// - If decoding yields zero frames
pub fn decode_bytes(data: Vec<u8>, extension: Option<&str>) -> Result<DecodedAudio, DecodeError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(DecodeError::Probe)?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoTrack)?;

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(DecodeError::Unsupported)?;

    let mut channels: Vec<Vec<f32>> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                tracing::warn!("Error reading packet, stopping decode: {e}");
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => append_planar_samples(&mut channels, &decoded),
            Err(e) => {
                // A corrupt packet is skipped, not fatal; symphonia resyncs
                // on the next one.
                tracing::warn!("Error decoding packet: {e}");
            }
        }
    }

    if channels.first().map(|c| c.is_empty()).unwrap_or(true) {
        return Err(DecodeError::EmptyStream);
    }

    tracing::debug!(
        "Decoded {} frames, {} channels at {} Hz",
        channels[0].len(),
        channels.len(),
        sample_rate
    );

    Ok(DecodedAudio::new(channels, sample_rate))
}

/// Appends one decoded buffer to the planar channel vectors, converting
/// samples to f32.
fn append_planar_samples(channels: &mut Vec<Vec<f32>>, decoded: &AudioBufferRef) {
    let count = match decoded {
        AudioBufferRef::F32(buf) => buf.spec().channels.count(),
        AudioBufferRef::F64(buf) => buf.spec().channels.count(),
        AudioBufferRef::S16(buf) => buf.spec().channels.count(),
        AudioBufferRef::S32(buf) => buf.spec().channels.count(),
        _ => {
            tracing::warn!("Skipping buffer with unsupported sample format");
            return;
        }
    };

    if channels.len() < count {
        channels.resize_with(count, Vec::new);
    }

    match decoded {
        AudioBufferRef::F32(buf) => {
            for ch in 0..count {
                channels[ch].extend_from_slice(buf.chan(ch));
            }
        }
        AudioBufferRef::F64(buf) => {
            for ch in 0..count {
                channels[ch].extend(buf.chan(ch).iter().map(|s| *s as f32));
            }
        }
        AudioBufferRef::S16(buf) => {
            for ch in 0..count {
                channels[ch].extend(buf.chan(ch).iter().map(|s| *s as f32 / 32768.0));
            }
        }
        AudioBufferRef::S32(buf) => {
            for ch in 0..count {
                channels[ch].extend(buf.chan(ch).iter().map(|s| *s as f32 / 2_147_483_648.0));
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::TAU;

    /// Writes a 16-bit WAV file and returns its bytes.
    fn wav_fixture(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.wav");

        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for sample in samples {
            writer.write_sample(*sample).unwrap();
        }
        writer.finalize().unwrap();

        std::fs::read(&path).unwrap()
    }

    #[test]
    fn test_decode_mono_wav() {
        let samples: Vec<i16> = (0..44_100)
            .map(|i| {
                let t = i as f32 / 44_100.0;
                ((t * 440.0 * TAU).sin() * 16_384.0) as i16
            })
            .collect();
        let bytes = wav_fixture(1, 44_100, &samples);

        let audio = decode_bytes(bytes, Some("wav")).unwrap();

        assert_eq!(audio.sample_rate(), 44_100);
        assert_eq!(audio.channel_count(), 1);
        assert_eq!(audio.frames(), 44_100);
        assert_relative_eq!(audio.peak(), 0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_decode_preserves_channel_identity() {
        // Interleaved stereo: left constant 0.25, right constant -0.75.
        let mut samples = Vec::new();
        for _ in 0..4_800 {
            samples.push(8_192i16);
            samples.push(-24_576i16);
        }
        let bytes = wav_fixture(2, 48_000, &samples);

        let audio = decode_bytes(bytes, Some("wav")).unwrap();

        assert_eq!(audio.channel_count(), 2);
        assert_eq!(audio.frames(), 4_800);
        let left = audio.channel(0).unwrap();
        let right = audio.channel(1).unwrap();
        assert_relative_eq!(left[0], 0.25, epsilon = 1e-4);
        assert_relative_eq!(right[0], -0.75, epsilon = 1e-4);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = decode_bytes(vec![0u8; 256], None);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_empty_input_fails() {
        let result = decode_bytes(Vec::new(), Some("wav"));
        assert!(result.is_err());
    }
}
