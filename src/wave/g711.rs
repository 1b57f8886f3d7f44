//! ITU-T G.711 companding
//!
//! Table-driven conversion between 16-bit linear PCM and 8-bit A-law or
//! µ-law codes. A-law codes have their even bits inverted (XOR 0x55) and
//! µ-law codes are stored bitwise complemented, as transmitted on the wire.

/// Largest magnitude either encoder represents
const CLIP: i32 = 32635;

/// µ-law bias added before segment lookup
const MULAW_BIAS: i32 = 0x84;

/// A-law segment number indexed by bits 8-14 of the magnitude
#[rustfmt::skip]
const ALAW_EXPONENT: [u8; 128] = [
    1, 1, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 4, 4, 4, 4, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5,
    6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6,
    7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7,
    7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7,
];

/// µ-law segment number indexed by bits 7-14 of the biased magnitude
#[rustfmt::skip]
const MULAW_EXPONENT: [u8; 256] = [
    0, 0, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 3, 3,
    4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
    5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5,
    5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5,
    6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6,
    6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6,
    6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6,
    6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6,
    7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7,
    7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7,
    7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7,
    7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7,
    7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7,
    7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7,
    7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7,
    7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7,
];

/// Segment base magnitudes for µ-law expansion
const MULAW_SEGMENT_BASE: [i32; 8] = [0, 132, 396, 924, 1980, 4092, 8316, 16764];

/// Encode one 16-bit linear sample as A-law
pub fn linear_to_alaw(sample: i16) -> u8 {
    // -32768 has no positive counterpart
    let mut magnitude = i32::from(sample.max(-32767));

    // Inverted sign bit: 0x80 for non-negative input
    let sign = ((!magnitude) >> 8) & 0x80;
    if sign == 0 {
        magnitude = -magnitude;
    }
    magnitude = magnitude.min(CLIP);

    let companded = if magnitude >= 256 {
        let exponent = i32::from(ALAW_EXPONENT[((magnitude >> 8) & 0x7F) as usize]);
        let mantissa = (magnitude >> (exponent + 3)) & 0x0F;
        (exponent << 4) | mantissa
    } else {
        magnitude >> 4
    };

    (companded ^ (sign ^ 0x55)) as u8
}

/// Decode one A-law code to 16-bit linear
pub fn alaw_to_linear(code: u8) -> i16 {
    let mut value = i32::from(code ^ 0x55);

    let sign_set = value & 0x80 != 0;
    value &= 0x7F;

    let position = ((value & 0xF0) >> 4) + 4;
    let magnitude = if position != 4 {
        (1 << position) | ((value & 0x0F) << (position - 4)) | (1 << (position - 5))
    } else {
        (value << 1) | 1
    };

    // Sign bit set marks a non-negative sample
    let linear = magnitude * -8;
    (if sign_set { -linear } else { linear }) as i16
}

/// Encode one 16-bit linear sample as µ-law
pub fn linear_to_mulaw(sample: i16) -> u8 {
    let mut magnitude = i32::from(sample);

    let sign = (magnitude >> 8) & 0x80;
    if sign != 0 {
        magnitude = -magnitude;
    }
    magnitude = (magnitude + MULAW_BIAS).min(CLIP);

    let exponent = i32::from(MULAW_EXPONENT[((magnitude >> 7) & 0xFF) as usize]);
    let mantissa = (magnitude >> (exponent + 3)) & 0x0F;

    !((sign | (exponent << 4) | mantissa) as u8)
}

/// Decode one µ-law code to 16-bit linear
pub fn mulaw_to_linear(code: u8) -> i16 {
    let value = i32::from(!code);

    let sign = value & 0x80;
    let exponent = ((value >> 4) & 0x07) as usize;
    let mantissa = value & 0x0F;

    let magnitude = MULAW_SEGMENT_BASE[exponent] + (mantissa << (exponent + 3));
    (if sign != 0 { -magnitude } else { magnitude }) as i16
}

/// Encode a block of linear samples as A-law
pub fn encode_alaw(samples: &[i16]) -> Vec<u8> {
    samples.iter().map(|&s| linear_to_alaw(s)).collect()
}

/// Decode a block of A-law codes
pub fn decode_alaw(codes: &[u8]) -> Vec<i16> {
    codes.iter().map(|&c| alaw_to_linear(c)).collect()
}

/// Encode a block of linear samples as µ-law
pub fn encode_mulaw(samples: &[i16]) -> Vec<u8> {
    samples.iter().map(|&s| linear_to_mulaw(s)).collect()
}

/// Decode a block of µ-law codes
pub fn decode_mulaw(codes: &[u8]) -> Vec<i16> {
    codes.iter().map(|&c| mulaw_to_linear(c)).collect()
}
