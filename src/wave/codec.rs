//! Channel-level encode, decode and repair

use super::convert;
use super::decoder::{decode_container, DecodedContainer};
use super::encoder::encode_container;
use super::error::{WaveError, WaveResult};
use super::format::{BitDepth, FormatHeader, SampleFormat};
use crate::config::{DecodeOptions, EncodeOptions};

/// Float channels and their sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

/// Encode float channels to a complete WAV file
pub fn encode_from_channels<C: AsRef<[f32]>>(
    channels: &[C],
    sample_rate: u32,
    options: &EncodeOptions,
) -> WaveResult<Vec<u8>> {
    let sample_bytes =
        convert::float32_channels_to_buffer(channels, options.sample_format, options.bit_depth)?;

    let channel_count = u16::try_from(channels.len()).map_err(|_| WaveError::OutOfRangeValue {
        value: channels.len() as u64,
        bits: 16,
    })?;
    let header = FormatHeader::new(
        options.sample_format,
        channel_count,
        sample_rate,
        options.bit_depth.bits(),
        options.speaker_mask,
    )?;
    encode_container(&sample_bytes, &header)
}

/// Wrap already encoded sample bytes in a WAV container
pub fn encode_from_buffer(
    sample_bytes: &[u8],
    sample_rate: u32,
    channel_count: u16,
    bit_depth: BitDepth,
    sample_format: SampleFormat,
    speaker_mask: u32,
) -> WaveResult<Vec<u8>> {
    let header = FormatHeader::new(
        sample_format,
        channel_count,
        sample_rate,
        bit_depth.bits(),
        speaker_mask,
    )?;
    encode_container(sample_bytes, &header)
}

/// Decode the container without converting samples
pub fn decode_to_buffer(bytes: &[u8], options: &DecodeOptions) -> WaveResult<DecodedContainer> {
    decode_container(bytes, options)
}

/// Decode a WAV file to float channels
pub fn decode_to_channels(bytes: &[u8], options: &DecodeOptions) -> WaveResult<DecodedAudio> {
    let decoded = decode_container(bytes, options)?;
    let header = decoded.header;

    let channels = convert::buffer_to_float32_channels(
        &decoded.data,
        usize::from(header.channel_count()),
        header.sample_format(),
        header.bit_depth(),
    )?;

    Ok(DecodedAudio {
        channels,
        sample_rate: header.sample_rate(),
    })
}

/// Re-encode a damaged file with consistent size fields and a single data
/// chunk. Sample bytes are copied, never converted.
pub fn repair(bytes: &[u8]) -> WaveResult<Vec<u8>> {
    let decoded = decode_container(bytes, &DecodeOptions::maximally_tolerant())?;
    log::info!(
        "Repairing wave data: {} input bytes, {} sample bytes recovered",
        bytes.len(),
        decoded.data.len()
    );
    encode_container(&decoded.data, &decoded.header)
}
