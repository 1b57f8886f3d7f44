//! fmt subchunk model
//!
//! `FormatHeader` describes how the data subchunk is laid out. It serializes
//! to either the standard layout (16-byte body for PCM, 18 bytes for the
//! other formats) or the WAVE_FORMAT_EXTENSIBLE layout (40-byte body ending
//! in a subformat GUID).

use super::binary::{BinaryCursor, FourCc};
use super::error::{WaveError, WaveResult};

/// Format id written in place of the real one in extensible fmt chunks
pub const EXTENSIBLE_FORMAT_ID: u16 = 0xFFFE;

const STANDARD_PCM_BODY_SIZE: usize = 16;
const STANDARD_BODY_SIZE: usize = 18;
const EXTENSIBLE_BODY_SIZE: usize = 40;
const EXTENSION_SIZE: u64 = 22;

/// On-disk sample encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum SampleFormat {
    /// Linear PCM (offset-binary at 8 bits, two's complement above)
    Pcm = 1,
    /// IEEE 754 float
    Float = 3,
    /// G.711 A-law
    Alaw = 6,
    /// G.711 µ-law
    Mulaw = 7,
}

/// Subformat GUIDs, byte-exact as stored in the file.
///
/// Each is the format id followed by the KSDATAFORMAT suffix
/// 00000000-0010-8000-00aa00389b71.
const FORMAT_GUIDS: [(SampleFormat, [u8; 16]); 4] = [
    (SampleFormat::Pcm, ksdataformat_guid(SampleFormat::Pcm as u16)),
    (SampleFormat::Float, ksdataformat_guid(SampleFormat::Float as u16)),
    (SampleFormat::Alaw, ksdataformat_guid(SampleFormat::Alaw as u16)),
    (SampleFormat::Mulaw, ksdataformat_guid(SampleFormat::Mulaw as u16)),
];

const fn ksdataformat_guid(id: u16) -> [u8; 16] {
    let id = id.to_le_bytes();
    [
        id[0], id[1], 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xaa, 0x00, 0x38,
        0x9b, 0x71,
    ]
}

impl SampleFormat {
    /// Numeric format id as written in a standard fmt chunk
    pub fn id(self) -> u16 {
        self as u16
    }

    /// Resolve a numeric format id
    pub fn from_id(id: u16) -> WaveResult<Self> {
        match id {
            1 => Ok(SampleFormat::Pcm),
            3 => Ok(SampleFormat::Float),
            6 => Ok(SampleFormat::Alaw),
            7 => Ok(SampleFormat::Mulaw),
            other => Err(WaveError::UnsupportedSampleFormat(other)),
        }
    }

    /// Whether this format can be stored at `bit_depth`
    pub fn supports(self, bit_depth: BitDepth) -> bool {
        use BitDepth::*;
        match self {
            SampleFormat::Pcm => matches!(bit_depth, Bits8 | Bits16 | Bits24 | Bits32),
            SampleFormat::Float => matches!(bit_depth, Bits32 | Bits64),
            SampleFormat::Alaw | SampleFormat::Mulaw => bit_depth == Bits8,
        }
    }

    /// Subformat GUID used in extensible fmt chunks
    pub fn guid(self) -> Option<[u8; 16]> {
        FORMAT_GUIDS
            .iter()
            .find(|(format, _)| *format == self)
            .map(|(_, guid)| *guid)
    }

    /// Resolve a subformat GUID by exact byte match
    pub fn from_guid(guid: &[u8; 16]) -> WaveResult<Self> {
        FORMAT_GUIDS
            .iter()
            .find(|(_, known)| known == guid)
            .map(|(format, _)| *format)
            .ok_or(WaveError::UnsupportedGuid(*guid))
    }

    /// Size of the standard (non-extensible) fmt chunk body
    fn standard_body_size(self) -> usize {
        match self {
            SampleFormat::Pcm => STANDARD_PCM_BODY_SIZE,
            SampleFormat::Float | SampleFormat::Alaw | SampleFormat::Mulaw => STANDARD_BODY_SIZE,
        }
    }
}

/// Bits per stored sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum BitDepth {
    Bits8 = 8,
    Bits16 = 16,
    Bits24 = 24,
    Bits32 = 32,
    Bits64 = 64,
}

impl BitDepth {
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            8 => Some(BitDepth::Bits8),
            16 => Some(BitDepth::Bits16),
            24 => Some(BitDepth::Bits24),
            32 => Some(BitDepth::Bits32),
            64 => Some(BitDepth::Bits64),
            _ => None,
        }
    }

    pub fn bits(self) -> u16 {
        self as u16
    }

    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }
}

/// Parsed or to-be-written fmt subchunk.
///
/// Block align and byte rate are always derived from the other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHeader {
    sample_format: SampleFormat,
    channel_count: u16,
    sample_rate: u32,
    bit_depth: BitDepth,
    speaker_mask: u32,
}

impl FormatHeader {
    pub fn new(
        sample_format: SampleFormat,
        channel_count: u16,
        sample_rate: u32,
        bits: u16,
        speaker_mask: u32,
    ) -> WaveResult<Self> {
        if channel_count == 0 {
            return Err(WaveError::InvalidChannelCount(0));
        }
        if sample_rate == 0 {
            return Err(WaveError::InvalidSampleRate);
        }
        let bit_depth = BitDepth::from_bits(bits)
            .filter(|depth| sample_format.supports(*depth))
            .ok_or(WaveError::UnsupportedBitDepth {
                format: sample_format,
                bits,
            })?;

        Ok(Self {
            sample_format,
            channel_count,
            sample_rate,
            bit_depth,
            speaker_mask,
        })
    }

    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    pub fn speaker_mask(&self) -> u32 {
        self.speaker_mask
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.bit_depth.bytes()
    }

    /// Bytes per sample frame
    pub fn block_align(&self) -> u64 {
        self.bit_depth.bytes() as u64 * u64::from(self.channel_count)
    }

    /// Bytes per second
    pub fn byte_rate(&self) -> u64 {
        u64::from(self.sample_rate) * self.block_align()
    }

    /// Whether the encoder picks the extensible layout for this header
    pub fn needs_extensible(&self) -> bool {
        self.bit_depth > BitDepth::Bits16 || self.channel_count > 2
    }

    /// Serialize the whole chunk, including the `fmt ` tag and size field
    pub fn serialize(&self, use_extensible: bool) -> WaveResult<Vec<u8>> {
        let (format_id, body_size) = if use_extensible {
            (EXTENSIBLE_FORMAT_ID, EXTENSIBLE_BODY_SIZE)
        } else {
            (self.sample_format.id(), self.sample_format.standard_body_size())
        };

        let mut cursor = BinaryCursor::new(vec![0u8; 8 + body_size]);
        cursor.write_bytes(0, FourCc::FMT.as_bytes())?;
        cursor.write_u32_le(4, body_size as u64)?;
        cursor.write_u16_le(8, u64::from(format_id))?;
        cursor.write_u16_le(10, u64::from(self.channel_count))?;
        cursor.write_u32_le(12, u64::from(self.sample_rate))?;
        cursor.write_u32_le(16, self.byte_rate())?;
        cursor.write_u16_le(20, self.block_align())?;
        cursor.write_u16_le(22, u64::from(self.bit_depth.bits()))?;

        if use_extensible {
            let guid = self
                .sample_format
                .guid()
                .ok_or(WaveError::UnsupportedExtensible(self.sample_format))?;
            cursor.write_u16_le(24, EXTENSION_SIZE)?;
            cursor.write_u16_le(26, u64::from(self.bit_depth.bits()))?;
            cursor.write_u32_le(28, u64::from(self.speaker_mask))?;
            cursor.write_bytes(32, &guid)?;
        }

        Ok(cursor.into_inner())
    }

    /// Parse a fmt chunk body (without the tag and size field)
    pub fn deserialize(body: &[u8]) -> WaveResult<Self> {
        let cursor = BinaryCursor::new(body);
        let format_id = cursor.read_u16_le(0)?;
        let channel_count = cursor.read_u16_le(2)?;
        let sample_rate = cursor.read_u32_le(4)?;
        let bits = cursor.read_u16_le(14)?;

        let (sample_format, speaker_mask) = if format_id == EXTENSIBLE_FORMAT_ID {
            if body.len() < EXTENSIBLE_BODY_SIZE {
                return Err(WaveError::CorruptChunkSize(format!(
                    "Format subchunk specifies a format id of {} (extensible) but its body size is {} bytes, which is smaller than the minimum expected of {} bytes",
                    EXTENSIBLE_FORMAT_ID,
                    body.len(),
                    EXTENSIBLE_BODY_SIZE
                )));
            }
            let speaker_mask = cursor.read_u32_le(20)?;
            let guid = cursor.read_bytes::<16>(24)?;
            (SampleFormat::from_guid(&guid)?, speaker_mask)
        } else {
            (SampleFormat::from_id(format_id)?, 0)
        };

        Self::new(sample_format, channel_count, sample_rate, bits, speaker_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(format: SampleFormat, channels: u16, bits: u16) -> FormatHeader {
        FormatHeader::new(format, channels, 44100, bits, 0).unwrap()
    }

    #[test]
    fn test_sample_format_ids() {
        assert_eq!(SampleFormat::from_id(1), Ok(SampleFormat::Pcm));
        assert_eq!(SampleFormat::from_id(3), Ok(SampleFormat::Float));
        assert_eq!(SampleFormat::from_id(6), Ok(SampleFormat::Alaw));
        assert_eq!(SampleFormat::from_id(7), Ok(SampleFormat::Mulaw));
        assert_eq!(
            SampleFormat::from_id(2),
            Err(WaveError::UnsupportedSampleFormat(2))
        );
    }

    #[test]
    fn test_guid_table_is_bidirectional() {
        for format in [
            SampleFormat::Pcm,
            SampleFormat::Float,
            SampleFormat::Alaw,
            SampleFormat::Mulaw,
        ] {
            let guid = format.guid().unwrap();
            assert_eq!(guid[0] as u16, format.id());
            assert_eq!(SampleFormat::from_guid(&guid), Ok(format));
        }
    }

    #[test]
    fn test_pcm_guid_bytes() {
        assert_eq!(
            SampleFormat::Pcm.guid().unwrap(),
            [
                0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xaa, 0x00,
                0x38, 0x9b, 0x71
            ]
        );
    }

    #[test]
    fn test_allowed_bit_depths() {
        assert!(SampleFormat::Pcm.supports(BitDepth::Bits24));
        assert!(!SampleFormat::Pcm.supports(BitDepth::Bits64));
        assert!(SampleFormat::Float.supports(BitDepth::Bits64));
        assert!(!SampleFormat::Float.supports(BitDepth::Bits16));
        assert!(SampleFormat::Alaw.supports(BitDepth::Bits8));
        assert!(!SampleFormat::Mulaw.supports(BitDepth::Bits16));
    }

    #[test]
    fn test_new_validates_fields() {
        assert_eq!(
            FormatHeader::new(SampleFormat::Pcm, 0, 44100, 16, 0),
            Err(WaveError::InvalidChannelCount(0))
        );
        assert_eq!(
            FormatHeader::new(SampleFormat::Pcm, 1, 0, 16, 0),
            Err(WaveError::InvalidSampleRate)
        );
        assert_eq!(
            FormatHeader::new(SampleFormat::Float, 1, 44100, 16, 0),
            Err(WaveError::UnsupportedBitDepth {
                format: SampleFormat::Float,
                bits: 16
            })
        );
        assert_eq!(
            FormatHeader::new(SampleFormat::Pcm, 1, 44100, 12, 0),
            Err(WaveError::UnsupportedBitDepth {
                format: SampleFormat::Pcm,
                bits: 12
            })
        );
    }

    #[test]
    fn test_derived_fields() {
        let h = FormatHeader::new(SampleFormat::Pcm, 2, 48000, 24, 0).unwrap();
        assert_eq!(h.block_align(), 6);
        assert_eq!(h.byte_rate(), 288_000);
        assert!(h.needs_extensible());
        assert!(!header(SampleFormat::Pcm, 2, 16).needs_extensible());
        assert!(header(SampleFormat::Pcm, 3, 16).needs_extensible());
    }

    #[test]
    fn test_serialize_standard_pcm() {
        let bytes = header(SampleFormat::Pcm, 2, 16).serialize(false).unwrap();
        assert_eq!(
            bytes,
            vec![
                b'f', b'm', b't', b' ', 16, 0, 0, 0, // tag, size
                1, 0, 2, 0, // format, channels
                0x44, 0xAC, 0, 0, // 44100
                0x10, 0xB1, 0x02, 0, // 176400
                4, 0, 16, 0, // block align, bits
            ]
        );
    }

    #[test]
    fn test_serialize_standard_float_has_cb_size() {
        let bytes = header(SampleFormat::Float, 1, 32).serialize(false).unwrap();
        assert_eq!(bytes.len(), 26);
        assert_eq!(&bytes[4..8], &[18, 0, 0, 0]);
        assert_eq!(&bytes[8..10], &[3, 0]);
        assert_eq!(&bytes[24..26], &[0, 0]);
    }

    #[test]
    fn test_serialize_extensible() {
        let h = FormatHeader::new(SampleFormat::Mulaw, 3, 8000, 8, 0x0007).unwrap();
        let bytes = h.serialize(true).unwrap();
        assert_eq!(bytes.len(), 48);
        assert_eq!(&bytes[4..8], &[40, 0, 0, 0]);
        assert_eq!(&bytes[8..10], &[0xFE, 0xFF]);
        assert_eq!(&bytes[24..26], &[22, 0]);
        assert_eq!(&bytes[26..28], &[8, 0]);
        assert_eq!(&bytes[28..32], &[7, 0, 0, 0]);
        assert_eq!(&bytes[32..48], &SampleFormat::Mulaw.guid().unwrap());
    }

    #[test]
    fn test_serialize_rejects_oversized_block_align() {
        let h = FormatHeader::new(SampleFormat::Float, 9000, 44100, 64, 0).unwrap();
        assert_eq!(
            h.serialize(true),
            Err(WaveError::OutOfRangeValue {
                value: 72000,
                bits: 16
            })
        );
    }

    #[test]
    fn test_deserialize_round_trip() {
        for (h, ext) in [
            (header(SampleFormat::Pcm, 1, 8), false),
            (header(SampleFormat::Float, 2, 64), false),
            (header(SampleFormat::Alaw, 2, 8), false),
            (
                FormatHeader::new(SampleFormat::Pcm, 6, 96000, 24, 0x3F).unwrap(),
                true,
            ),
        ] {
            let bytes = h.serialize(ext).unwrap();
            assert_eq!(FormatHeader::deserialize(&bytes[8..]).unwrap(), h);
        }
    }

    #[test]
    fn test_deserialize_extensible_too_short() {
        let bytes = header(SampleFormat::Pcm, 3, 16).serialize(true).unwrap();
        let result = FormatHeader::deserialize(&bytes[8..30]);
        assert!(matches!(result, Err(WaveError::CorruptChunkSize(_))));
    }

    #[test]
    fn test_deserialize_unknown_guid() {
        let mut bytes = header(SampleFormat::Pcm, 3, 16).serialize(true).unwrap();
        bytes[32] = 0x55;
        let result = FormatHeader::deserialize(&bytes[8..]);
        assert!(matches!(result, Err(WaveError::UnsupportedGuid(g)) if g[0] == 0x55));
    }

    #[test]
    fn test_deserialize_bad_bit_depth() {
        let mut bytes = header(SampleFormat::Alaw, 1, 8).serialize(false).unwrap();
        bytes[22] = 16;
        assert_eq!(
            FormatHeader::deserialize(&bytes[8..]),
            Err(WaveError::UnsupportedBitDepth {
                format: SampleFormat::Alaw,
                bits: 16
            })
        );
    }

    #[test]
    fn test_deserialize_short_body() {
        let result = FormatHeader::deserialize(&[1, 0, 1, 0]);
        assert!(matches!(result, Err(WaveError::UnexpectedEnd { .. })));
    }
}
