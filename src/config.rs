use anyhow::{Context, Result};

use crate::wave::{BitDepth, SampleFormat};

/// How forgiving the container decoder is about damaged length fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Accept RIFF and subchunk sizes that run past the end of the buffer
    pub tolerate_truncation: bool,
    /// Treat a 0xFFFFFFFF RIFF or data size as "up to the end of the buffer"
    pub tolerate_overflow: bool,
    /// Skip the RIFF size check entirely and trust only the subchunk walk
    pub ignore_riff_size: bool,
}

impl DecodeOptions {
    /// Reject every length field that disagrees with the buffer
    pub fn strict() -> Self {
        Self {
            tolerate_truncation: false,
            tolerate_overflow: false,
            ignore_riff_size: false,
        }
    }

    /// Accept anything the subchunk walk can still make sense of
    pub fn maximally_tolerant() -> Self {
        Self {
            tolerate_truncation: true,
            tolerate_overflow: true,
            ignore_riff_size: true,
        }
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            tolerate_truncation: true,
            tolerate_overflow: true,
            ignore_riff_size: false,
        }
    }
}

/// Target layout when encoding float channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub bit_depth: BitDepth,
    pub sample_format: SampleFormat,
    /// Channel-to-speaker bitmask, only written in extensible fmt chunks
    pub speaker_mask: u32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            bit_depth: BitDepth::Bits16,
            sample_format: SampleFormat::Pcm,
            speaker_mask: 0,
        }
    }
}

/// Parse a sample format name (pcm, float, alaw, mulaw)
pub fn parse_sample_format(s: &str) -> Result<SampleFormat> {
    match s.to_ascii_lowercase().as_str() {
        "pcm" => Ok(SampleFormat::Pcm),
        "float" | "ieee" | "ieee-float" => Ok(SampleFormat::Float),
        "alaw" | "a-law" => Ok(SampleFormat::Alaw),
        "mulaw" | "ulaw" | "mu-law" | "u-law" => Ok(SampleFormat::Mulaw),
        _ => anyhow::bail!(
            "Invalid sample format: {}. Valid options: pcm, float, alaw, mulaw",
            s
        ),
    }
}

/// Parse a bit depth (8, 16, 24, 32 or 64)
pub fn parse_bit_depth(s: &str) -> Result<BitDepth> {
    let bits: u16 = s
        .trim()
        .parse()
        .with_context(|| format!("Invalid bit depth: {}", s))?;
    BitDepth::from_bits(bits)
        .with_context(|| format!("Unsupported bit depth: {} (expected 8, 16, 24, 32 or 64)", bits))
}

/// Parse a speaker mask given in decimal or 0x-prefixed hex
pub fn parse_speaker_mask(s: &str) -> Result<u32> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.with_context(|| format!("Invalid speaker mask: {}", s))
}
