//! Audio decoding: WAV (RIFF) parsed to normalized PCM, compressed formats
//! passed through for the embedding engine's own decoder.

use forage_core::{AudioBuffer, AudioFormat};
use thiserror::Error;

/// Error raised while decoding an audio payload.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Payload ended before a complete header or chunk.
    #[error("truncated audio payload")]
    Truncated,
    /// Payload does not start with a RIFF/WAVE header.
    #[error("not a riff wave payload")]
    BadMagic,
    /// A required chunk is absent.
    #[error("missing riff chunk")]
    MissingChunk {
        /// Four-character tag of the absent chunk.
        tag: &'static str,
    },
    /// Sample encoding is not supported by the reader.
    #[error("unsupported sample layout")]
    UnsupportedLayout {
        /// RIFF format tag (1 = integer PCM, 3 = IEEE float).
        format_tag: u16,
        /// Bits per sample.
        bits: u16,
    },
    /// Format chunk declared zero channels.
    #[error("zero channels")]
    ZeroChannels,
    /// Extension does not name a known audio container.
    #[error("unknown audio format")]
    UnknownFormat {
        /// Offending file extension.
        extension: String,
    },
}

/// Decode an audio payload for the given lowercase file extension.
///
/// WAV payloads are parsed to normalized interleaved `f32` PCM; mp3/ogg/aac
/// pass through as [`AudioBuffer::Encoded`].
///
/// # Errors
///
/// Returns an [`AudioError`] for malformed WAV payloads or extensions
/// outside the audio table; the caller treats both as recoverable per-asset
/// failures.
pub fn decode_audio(extension: &str, bytes: Vec<u8>) -> Result<AudioBuffer, AudioError> {
    match extension {
        "wav" => decode_wav(&bytes),
        "mp3" => Ok(AudioBuffer::Encoded {
            format: AudioFormat::Mp3,
            bytes,
        }),
        "ogg" => Ok(AudioBuffer::Encoded {
            format: AudioFormat::Ogg,
            bytes,
        }),
        "aac" => Ok(AudioBuffer::Encoded {
            format: AudioFormat::Aac,
            bytes,
        }),
        other => Err(AudioError::UnknownFormat {
            extension: other.to_string(),
        }),
    }
}

struct FmtChunk {
    format_tag: u16,
    channels: u16,
    sample_rate: u32,
    bits: u16,
}

/// Parse a RIFF/WAVE payload into normalized PCM.
///
/// Supports integer PCM at 8/16/24/32 bits and IEEE float32, interleaved.
/// The first `data` chunk wins; unknown chunks are skipped.
///
/// # Errors
///
/// Returns an [`AudioError`] when the header, a required chunk, or the
/// sample layout cannot be read.
pub fn decode_wav(bytes: &[u8]) -> Result<AudioBuffer, AudioError> {
    if bytes.len() < 12 {
        return Err(AudioError::Truncated);
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(AudioError::BadMagic);
    }

    let mut fmt: Option<FmtChunk> = None;
    let mut data: Option<&[u8]> = None;
    let mut offset = 12usize;
    while offset + 8 <= bytes.len() {
        let tag = &bytes[offset..offset + 4];
        let length = read_u32(bytes, offset + 4)? as usize;
        let body_start = offset + 8;
        let body_end = body_start.checked_add(length).ok_or(AudioError::Truncated)?;
        if body_end > bytes.len() {
            return Err(AudioError::Truncated);
        }
        let body = &bytes[body_start..body_end];
        match tag {
            b"fmt " => fmt = Some(parse_fmt(body)?),
            b"data" if data.is_none() => data = Some(body),
            _ => {}
        }
        // Chunks are word-aligned; odd lengths carry a pad byte.
        offset = body_end + (length & 1);
    }

    let fmt = fmt.ok_or(AudioError::MissingChunk { tag: "fmt " })?;
    let data = data.ok_or(AudioError::MissingChunk { tag: "data" })?;
    let samples = convert_samples(data, &fmt)?;
    Ok(AudioBuffer::Pcm {
        sample_rate: fmt.sample_rate,
        channels: fmt.channels,
        samples,
    })
}

fn parse_fmt(body: &[u8]) -> Result<FmtChunk, AudioError> {
    let format_tag = read_u16(body, 0)?;
    let channels = read_u16(body, 2)?;
    let sample_rate = read_u32(body, 4)?;
    let bits = read_u16(body, 14)?;
    if channels == 0 {
        return Err(AudioError::ZeroChannels);
    }
    Ok(FmtChunk {
        format_tag,
        channels,
        sample_rate,
        bits,
    })
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn convert_samples(data: &[u8], fmt: &FmtChunk) -> Result<Vec<f32>, AudioError> {
    match (fmt.format_tag, fmt.bits) {
        (1, 8) => Ok(data
            .iter()
            .map(|&sample| (f32::from(sample) - 128.0) / 128.0)
            .collect()),
        (1, 16) => Ok(data
            .chunks_exact(2)
            .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32_768.0)
            .collect()),
        (1, 24) => Ok(data
            .chunks_exact(3)
            .map(|triple| {
                let extend = if triple[2] & 0x80 == 0 { 0x00 } else { 0xFF };
                let value = i32::from_le_bytes([triple[0], triple[1], triple[2], extend]);
                value as f32 / 8_388_608.0
            })
            .collect()),
        (1, 32) => Ok(data
            .chunks_exact(4)
            .map(|quad| {
                let value = i32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]]);
                (f64::from(value) / 2_147_483_648.0) as f32
            })
            .collect()),
        (3, 32) => Ok(data
            .chunks_exact(4)
            .map(|quad| f32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]]))
            .collect()),
        (format_tag, bits) => Err(AudioError::UnsupportedLayout { format_tag, bits }),
    }
}

fn read_u16(bytes: &[u8], at: usize) -> Result<u16, AudioError> {
    bytes
        .get(at..at + 2)
        .and_then(|slice| slice.try_into().ok())
        .map(u16::from_le_bytes)
        .ok_or(AudioError::Truncated)
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, AudioError> {
    bytes
        .get(at..at + 4)
        .and_then(|slice| slice.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(AudioError::Truncated)
}
