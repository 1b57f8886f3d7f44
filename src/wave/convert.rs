//! Conversion between normalized float32 channels and stored sample bytes
//!
//! Integer PCM uses a symmetric scale of 2^(bits-1): encoding rounds to the
//! nearest step and clips to the two's-complement range, decoding divides
//! without clipping. 8-bit PCM is offset-binary around 128. A-law and µ-law
//! go through 16-bit PCM on both sides.

use super::error::{WaveError, WaveResult};
use super::format::{BitDepth, SampleFormat};
use super::g711;

/// Interleave equal-length channels into one frame-ordered buffer
pub fn interleave<C: AsRef<[f32]>>(channels: &[C]) -> WaveResult<Vec<f32>> {
    let first = channels.first().ok_or(WaveError::EmptyChannelSet)?.as_ref();
    let frames = first.len();

    for (channel, samples) in channels.iter().enumerate().skip(1) {
        let actual = samples.as_ref().len();
        if actual != frames {
            return Err(WaveError::ChannelLengthMismatch {
                channel,
                expected: frames,
                actual,
            });
        }
    }

    if channels.len() == 1 {
        return Ok(first.to_vec());
    }

    let channel_count = channels.len();
    let mut out = vec![0.0f32; frames * channel_count];
    for (c, samples) in channels.iter().enumerate() {
        for (i, &sample) in samples.as_ref().iter().enumerate() {
            out[i * channel_count + c] = sample;
        }
    }
    Ok(out)
}

/// Split a frame-ordered buffer back into `channel_count` channels
pub fn deinterleave(samples: &[f32], channel_count: usize) -> WaveResult<Vec<Vec<f32>>> {
    if channel_count < 1 {
        return Err(WaveError::InvalidChannelCount(channel_count));
    }
    check_divisible(samples.len(), channel_count)?;

    if channel_count == 1 {
        return Ok(vec![samples.to_vec()]);
    }

    let frames = samples.len() / channel_count;
    let mut channels: Vec<Vec<f32>> = (0..channel_count)
        .map(|_| Vec::with_capacity(frames))
        .collect();
    for frame in samples.chunks_exact(channel_count) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }
    Ok(channels)
}

/// Convert interleaved float samples to stored bytes
pub fn encode_samples(
    samples: &[f32],
    format: SampleFormat,
    bit_depth: BitDepth,
) -> WaveResult<Vec<u8>> {
    use BitDepth::*;
    use SampleFormat::*;

    let bytes = match (format, bit_depth) {
        (Pcm, Bits8) => float_to_pcm_u8(samples),
        (Pcm, Bits16) => pack_i16_le(&float_to_pcm_i16(samples)),
        (Pcm, Bits24) => pack_i24_le(&quantize_all(samples, 24)),
        (Pcm, Bits32) => pack_i32_le(&quantize_all(samples, 32)),
        (Float, Bits32) => samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
        (Float, Bits64) => samples
            .iter()
            .flat_map(|&s| f64::from(s).to_le_bytes())
            .collect(),
        (Alaw, Bits8) => g711::encode_alaw(&float_to_pcm_i16(samples)),
        (Mulaw, Bits8) => g711::encode_mulaw(&float_to_pcm_i16(samples)),
        (format, depth) => {
            return Err(WaveError::UnsupportedCombination {
                format,
                bits: depth.bits(),
            })
        }
    };
    Ok(bytes)
}

/// Convert stored bytes to interleaved float samples
pub fn decode_samples(
    bytes: &[u8],
    format: SampleFormat,
    bit_depth: BitDepth,
) -> WaveResult<Vec<f32>> {
    use BitDepth::*;
    use SampleFormat::*;

    let samples = match (format, bit_depth) {
        (Pcm, Bits8) => pcm_u8_to_float(bytes),
        (Pcm, Bits16) => pcm_i16_to_float(&unpack_i16_le(bytes)?),
        (Pcm, Bits24) => dequantize_all(&unpack_i24_le(bytes)?, 24),
        (Pcm, Bits32) => dequantize_all(&unpack_i32_le(bytes)?, 32),
        (Float, Bits32) => {
            check_divisible(bytes.len(), 4)?;
            bytes
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect()
        }
        (Float, Bits64) => {
            check_divisible(bytes.len(), 8)?;
            bytes
                .chunks_exact(8)
                .map(|b| {
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(b);
                    f64::from_le_bytes(raw) as f32
                })
                .collect()
        }
        (Alaw, Bits8) => pcm_i16_to_float(&g711::decode_alaw(bytes)),
        (Mulaw, Bits8) => pcm_i16_to_float(&g711::decode_mulaw(bytes)),
        (format, depth) => {
            return Err(WaveError::UnsupportedCombination {
                format,
                bits: depth.bits(),
            })
        }
    };
    Ok(samples)
}

/// Interleave then encode
pub fn float32_channels_to_buffer<C: AsRef<[f32]>>(
    channels: &[C],
    format: SampleFormat,
    bit_depth: BitDepth,
) -> WaveResult<Vec<u8>> {
    let interleaved = interleave(channels)?;
    encode_samples(&interleaved, format, bit_depth)
}

/// Decode then deinterleave
pub fn buffer_to_float32_channels(
    bytes: &[u8],
    channel_count: usize,
    format: SampleFormat,
    bit_depth: BitDepth,
) -> WaveResult<Vec<Vec<f32>>> {
    let interleaved = decode_samples(bytes, format, bit_depth)?;
    deinterleave(&interleaved, channel_count)
}

fn check_divisible(len: usize, divisor: usize) -> WaveResult<()> {
    if len % divisor != 0 {
        return Err(WaveError::NotDivisible { len, divisor });
    }
    Ok(())
}

/// Round `sample * 2^(bits-1)` and clip to the signed `bits`-wide range
fn quantize(sample: f32, bits: u32) -> i32 {
    let scale = (1u64 << (bits - 1)) as f64;
    // NaN survives clamp and then casts to 0
    (f64::from(sample) * scale).round().clamp(-scale, scale - 1.0) as i32
}

fn dequantize(value: i32, bits: u32) -> f32 {
    let scale = (1u64 << (bits - 1)) as f64;
    (f64::from(value) / scale) as f32
}

fn quantize_all(samples: &[f32], bits: u32) -> Vec<i32> {
    samples.iter().map(|&s| quantize(s, bits)).collect()
}

fn dequantize_all(values: &[i32], bits: u32) -> Vec<f32> {
    values.iter().map(|&v| dequantize(v, bits)).collect()
}

fn float_to_pcm_u8(samples: &[f32]) -> Vec<u8> {
    samples.iter().map(|&s| (quantize(s, 8) + 128) as u8).collect()
}

fn pcm_u8_to_float(bytes: &[u8]) -> Vec<f32> {
    bytes.iter().map(|&b| (f32::from(b) - 128.0) / 128.0).collect()
}

fn float_to_pcm_i16(samples: &[f32]) -> Vec<i16> {
    samples.iter().map(|&s| quantize(s, 16) as i16).collect()
}

fn pcm_i16_to_float(values: &[i16]) -> Vec<f32> {
    values.iter().map(|&v| f32::from(v) / 32768.0).collect()
}

fn pack_i16_le(values: &[i16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn unpack_i16_le(bytes: &[u8]) -> WaveResult<Vec<i16>> {
    check_divisible(bytes.len(), 2)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect())
}

/// Low three bytes of each 32-bit lane, little-endian
fn pack_i24_le(values: &[i32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 3);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes()[..3]);
    }
    out
}

/// Sign-extends from bit 23 via an arithmetic shift
fn unpack_i24_le(bytes: &[u8]) -> WaveResult<Vec<i32>> {
    check_divisible(bytes.len(), 3)?;
    Ok(bytes
        .chunks_exact(3)
        .map(|b| i32::from_le_bytes([0, b[0], b[1], b[2]]) >> 8)
        .collect())
}

fn pack_i32_le(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn unpack_i32_le(bytes: &[u8]) -> WaveResult<Vec<i32>> {
    check_divisible(bytes.len(), 4)?;
    Ok(bytes
        .chunks_exact(4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleave_two_channels() {
        let left = vec![1.0f32, 2.0, 3.0];
        let right = vec![-1.0f32, -2.0, -3.0];
        assert_eq!(
            interleave(&[left, right]).unwrap(),
            vec![1.0, -1.0, 2.0, -2.0, 3.0, -3.0]
        );
    }

    #[test]
    fn test_interleave_errors() {
        let none: [Vec<f32>; 0] = [];
        assert_eq!(interleave(&none), Err(WaveError::EmptyChannelSet));
        assert_eq!(
            interleave(&[vec![0.0f32; 3], vec![0.0f32; 2]]),
            Err(WaveError::ChannelLengthMismatch {
                channel: 1,
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_single_channel_passthrough() {
        let mono = [0.25f32, -0.5];
        assert_eq!(interleave(&[&mono[..]]).unwrap(), mono.to_vec());
        assert_eq!(deinterleave(&mono, 1).unwrap(), vec![mono.to_vec()]);
    }

    #[test]
    fn test_deinterleave_errors() {
        assert_eq!(
            deinterleave(&[0.0; 4], 0),
            Err(WaveError::InvalidChannelCount(0))
        );
        assert_eq!(
            deinterleave(&[0.0; 5], 2),
            Err(WaveError::NotDivisible { len: 5, divisor: 2 })
        );
    }

    #[test]
    fn test_pcm16_quantization() {
        let bytes = encode_samples(&[0.0, 1.0, -1.0, 0.5, 2.0], SampleFormat::Pcm, BitDepth::Bits16)
            .unwrap();
        let values = unpack_i16_le(&bytes).unwrap();
        assert_eq!(values, vec![0, 32767, -32768, 16384, 32767]);
    }

    #[test]
    fn test_pcm_rounds_to_nearest() {
        // 0.7 / 32768 rounds up, truncation would give 0
        let s = 0.7f32 / 32768.0;
        assert_eq!(quantize(s, 16), 1);
        assert_eq!(quantize(-s, 16), -1);
        assert_eq!(quantize(f32::NAN, 16), 0);
    }

    #[test]
    fn test_pcm8_is_offset_binary() {
        let bytes = encode_samples(&[0.0, 1.0, -1.0, -0.5], SampleFormat::Pcm, BitDepth::Bits8)
            .unwrap();
        assert_eq!(bytes, vec![128, 255, 0, 64]);
        assert_eq!(
            decode_samples(&bytes, SampleFormat::Pcm, BitDepth::Bits8).unwrap(),
            vec![0.0, 127.0 / 128.0, -1.0, -0.5]
        );
    }

    #[test]
    fn test_pcm24_packing_and_sign_extension() {
        let bytes = pack_i24_le(&[1, -1, 8_388_607, -8_388_608]);
        assert_eq!(
            bytes,
            vec![1, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F, 0x00, 0x00, 0x80]
        );
        assert_eq!(
            unpack_i24_le(&bytes).unwrap(),
            vec![1, -1, 8_388_607, -8_388_608]
        );
        assert_eq!(
            unpack_i24_le(&[0, 0]),
            Err(WaveError::NotDivisible { len: 2, divisor: 3 })
        );
    }

    #[test]
    fn test_pcm32_clips_and_decodes_exactly() {
        let bytes = encode_samples(&[1.0, -1.0], SampleFormat::Pcm, BitDepth::Bits32).unwrap();
        assert_eq!(unpack_i32_le(&bytes).unwrap(), vec![i32::MAX, i32::MIN]);
        let decoded = decode_samples(&bytes, SampleFormat::Pcm, BitDepth::Bits32).unwrap();
        assert_eq!(decoded[1], -1.0);
    }

    #[test]
    fn test_float_paths_do_not_clip() {
        let input = [1.5f32, -2.25, 0.1];
        for depth in [BitDepth::Bits32, BitDepth::Bits64] {
            let bytes = encode_samples(&input, SampleFormat::Float, depth).unwrap();
            assert_eq!(bytes.len(), input.len() * depth.bytes());
            let decoded = decode_samples(&bytes, SampleFormat::Float, depth).unwrap();
            assert_eq!(decoded, input.to_vec());
        }
    }

    #[test]
    fn test_companded_silence() {
        let a = encode_samples(&[0.0], SampleFormat::Alaw, BitDepth::Bits8).unwrap();
        let m = encode_samples(&[0.0], SampleFormat::Mulaw, BitDepth::Bits8).unwrap();
        assert_eq!(a, vec![0xD5]);
        assert_eq!(m, vec![0xFF]);
    }

    #[test]
    fn test_unsupported_combination() {
        assert_eq!(
            encode_samples(&[0.0], SampleFormat::Float, BitDepth::Bits16),
            Err(WaveError::UnsupportedCombination {
                format: SampleFormat::Float,
                bits: 16
            })
        );
        assert_eq!(
            decode_samples(&[0], SampleFormat::Mulaw, BitDepth::Bits24),
            Err(WaveError::UnsupportedCombination {
                format: SampleFormat::Mulaw,
                bits: 24
            })
        );
    }

    #[test]
    fn test_channel_buffer_helpers() {
        let channels = vec![vec![0.5f32, -0.5], vec![0.25, -0.25]];
        let bytes =
            float32_channels_to_buffer(&channels, SampleFormat::Pcm, BitDepth::Bits16).unwrap();
        assert_eq!(bytes.len(), 8);
        let back =
            buffer_to_float32_channels(&bytes, 2, SampleFormat::Pcm, BitDepth::Bits16).unwrap();
        assert_eq!(back, channels);
    }
}
