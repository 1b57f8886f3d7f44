//! RIFF/WAVE container encoder
//!
//! Output is always `RIFF` header, one `fmt ` chunk, one `data` chunk. Size
//! fields that would exceed 32 bits are written as 0xFFFFFFFF while the full
//! sample buffer is still emitted.

use super::binary::{BinaryCursor, FourCc};
use super::error::WaveResult;
use super::format::FormatHeader;

/// Clamp a length to what a 32-bit RIFF size field can hold
fn size_field(len: u64, what: &str) -> u64 {
    let max = u64::from(u32::MAX);
    if len > max {
        log::warn!("{} length {} exceeds 4 GiB, writing 0x{:08X}", what, len, max);
        max
    } else {
        len
    }
}

/// Build a complete file from already encoded sample bytes
pub fn encode_container(sample_bytes: &[u8], header: &FormatHeader) -> WaveResult<Vec<u8>> {
    let use_extensible = header.needs_extensible();
    let fmt_chunk = header.serialize(use_extensible)?;

    let data_len = sample_bytes.len() as u64;
    let mut data_header = BinaryCursor::new([0u8; 8]);
    data_header.write_bytes(0, FourCc::DATA.as_bytes())?;
    data_header.write_u32_le(4, size_field(data_len, "data chunk"))?;

    let riff_len = 4 + fmt_chunk.len() as u64 + 8 + data_len;
    let mut riff_header = BinaryCursor::new([0u8; 12]);
    riff_header.write_bytes(0, FourCc::RIFF.as_bytes())?;
    riff_header.write_u32_le(4, size_field(riff_len, "RIFF chunk"))?;
    riff_header.write_bytes(8, FourCc::WAVE.as_bytes())?;

    log::debug!(
        "Encoding {} sample bytes with {} fmt chunk",
        sample_bytes.len(),
        if use_extensible { "extensible" } else { "standard" }
    );

    let mut out = Vec::with_capacity(12 + fmt_chunk.len() + 8 + sample_bytes.len());
    out.extend_from_slice(&riff_header.into_inner());
    out.extend_from_slice(&fmt_chunk);
    out.extend_from_slice(&data_header.into_inner());
    out.extend_from_slice(sample_bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wave::format::SampleFormat;

    #[test]
    fn test_encode_standard_layout() {
        let header = FormatHeader::new(SampleFormat::Pcm, 2, 44100, 16, 0).unwrap();
        let wav = encode_container(&[1, 2, 3, 4], &header).unwrap();

        assert_eq!(wav.len(), 12 + 24 + 8 + 4);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[4..8], &40u32.to_le_bytes());
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[16..20], &16u32.to_le_bytes());
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(&wav[40..44], &4u32.to_le_bytes());
        assert_eq!(&wav[44..], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_encode_picks_extensible() {
        let header = FormatHeader::new(SampleFormat::Pcm, 3, 44100, 16, 0).unwrap();
        let wav = encode_container(&[0; 6], &header).unwrap();
        assert_eq!(&wav[16..20], &40u32.to_le_bytes());
        assert_eq!(&wav[20..22], &[0xFE, 0xFF]);
        assert_eq!(&wav[44..60], &SampleFormat::Pcm.guid().unwrap());

        let header = FormatHeader::new(SampleFormat::Pcm, 1, 44100, 24, 0).unwrap();
        let wav = encode_container(&[0; 3], &header).unwrap();
        assert_eq!(&wav[16..20], &40u32.to_le_bytes());
    }

    #[test]
    fn test_encode_empty_data() {
        let header = FormatHeader::new(SampleFormat::Float, 1, 8000, 32, 0).unwrap();
        let wav = encode_container(&[], &header).unwrap();
        assert_eq!(wav.len(), 12 + 48 + 8);
        assert_eq!(&wav[4..8], &60u32.to_le_bytes());
        assert_eq!(&wav[60..64], b"data");
        assert_eq!(&wav[64..68], &0u32.to_le_bytes());

        let header = FormatHeader::new(SampleFormat::Pcm, 1, 8000, 16, 0).unwrap();
        let wav = encode_container(&[], &header).unwrap();
        assert_eq!(wav.len(), 12 + 24 + 8);
        assert_eq!(&wav[4..8], &36u32.to_le_bytes());
        assert_eq!(&wav[40..44], &0u32.to_le_bytes());
    }

    #[test]
    fn test_size_field_clamps() {
        assert_eq!(size_field(10, "test"), 10);
        assert_eq!(size_field(u64::from(u32::MAX), "test"), u64::from(u32::MAX));
        assert_eq!(size_field(1 << 33, "test"), u64::from(u32::MAX));
    }
}
