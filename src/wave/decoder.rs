//! RIFF/WAVE container decoder
//!
//! Walks the subchunks after the 12-byte RIFF header, keeps the last `fmt `
//! body and every `data` body in file order, and skips everything else by
//! its declared size. Length fields that disagree with the buffer are either
//! rejected or absorbed according to `DecodeOptions`.

use std::ops::Range;

use super::binary::{BinaryCursor, FourCc};
use super::error::{WaveError, WaveResult};
use super::format::FormatHeader;
use crate::config::DecodeOptions;

const RIFF_HEADER_SIZE: usize = 12;
const CHUNK_HEADER_SIZE: usize = 8;
const SIZE_SENTINEL: u32 = u32::MAX;

/// One subchunk as found by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    pub id: FourCc,
    /// Size field as stored in the file
    pub declared_size: u32,
    /// Body bytes actually present in the buffer
    pub body: Range<usize>,
}

/// Header and concatenated sample bytes of a decoded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedContainer {
    pub header: FormatHeader,
    pub data: Vec<u8>,
}

impl DecodedContainer {
    pub fn sample_rate(&self) -> u32 {
        self.header.sample_rate()
    }

    /// Number of whole sample frames in `data`
    pub fn frame_count(&self) -> u64 {
        self.data.len() as u64 / self.header.block_align()
    }
}

/// Iterator over the subchunks following the RIFF header
pub struct ChunkScanner<'a> {
    bytes: &'a [u8],
    offset: usize,
    options: DecodeOptions,
    done: bool,
}

impl<'a> ChunkScanner<'a> {
    /// Start scanning at the first subchunk. Does not validate the RIFF header.
    pub fn new(bytes: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            bytes,
            offset: RIFF_HEADER_SIZE,
            options,
            done: false,
        }
    }

    fn scan_next(&mut self) -> WaveResult<Option<RawChunk>> {
        let len = self.bytes.len();
        if self.offset >= len {
            return Ok(None);
        }

        if len - self.offset < CHUNK_HEADER_SIZE {
            if self.options.tolerate_truncation {
                log::warn!(
                    "Ignoring {} trailing bytes at offset {} (too short for a chunk header)",
                    len - self.offset,
                    self.offset
                );
                return Ok(None);
            }
            return Err(WaveError::CorruptChunkSize(format!(
                "{} trailing bytes at offset {} are too short for a chunk header",
                len - self.offset,
                self.offset
            )));
        }

        let cursor = BinaryCursor::new(self.bytes);
        let id = cursor.read_tag(self.offset)?;
        let declared_size = cursor.read_u32_le(self.offset + 4)?;
        let body_start = self.offset + CHUNK_HEADER_SIZE;
        let remaining = len - body_start;

        if !self.options.tolerate_truncation && declared_size as usize > remaining {
            return Err(WaveError::CorruptChunkSize(format!(
                "Encountered a '{}' subchunk with a size of {} which is greater than the remaining size of the buffer ({})",
                id, declared_size, remaining
            )));
        }

        let mut size = declared_size as usize;
        if id == FourCc::DATA && self.options.tolerate_overflow && declared_size == SIZE_SENTINEL {
            log::warn!(
                "data subchunk size is 0x{:08X}, reading to end of buffer ({} bytes)",
                SIZE_SENTINEL,
                remaining
            );
            size = remaining;
        } else if size > remaining {
            log::warn!(
                "'{}' subchunk declares {} bytes but only {} remain, truncating",
                id,
                declared_size,
                remaining
            );
        }

        let body = body_start..body_start + size.min(remaining);
        self.offset = body_start.saturating_add(size);

        Ok(Some(RawChunk {
            id,
            declared_size,
            body,
        }))
    }
}

impl Iterator for ChunkScanner<'_> {
    type Item = WaveResult<RawChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.scan_next().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

/// Verify the RIFF/WAVE tags and reconcile the RIFF size with the buffer
fn check_riff_header(bytes: &[u8], options: &DecodeOptions) -> WaveResult<()> {
    if bytes.len() < RIFF_HEADER_SIZE {
        return Err(WaveError::NotAWaveFile(format!(
            "Buffer is {} bytes, shorter than a RIFF header",
            bytes.len()
        )));
    }

    let cursor = BinaryCursor::new(bytes);
    if cursor.read_tag(0)? != FourCc::RIFF {
        return Err(WaveError::NotAWaveFile(
            "No RIFF id found at offset 0".to_string(),
        ));
    }
    if cursor.read_tag(8)? != FourCc::WAVE {
        return Err(WaveError::NotAWaveFile(
            "No WAVE id found at offset 8".to_string(),
        ));
    }

    if options.ignore_riff_size {
        return Ok(());
    }

    let actual = (bytes.len() - 8) as u64;
    let mut declared = u64::from(cursor.read_u32_le(4)?);

    if options.tolerate_overflow && declared == u64::from(SIZE_SENTINEL) {
        log::warn!(
            "RIFF size is 0x{:08X}, assuming {} bytes",
            SIZE_SENTINEL,
            actual
        );
        declared = actual;
    }

    if declared < actual {
        return Err(WaveError::CorruptChunkSize(format!(
            "RIFF chunk length {} is smaller than the remaining size of the buffer ({})",
            declared, actual
        )));
    }

    if declared > actual {
        if !options.tolerate_truncation {
            return Err(WaveError::CorruptChunkSize(format!(
                "RIFF chunk length ({}) is greater than the remaining size of the buffer ({})",
                declared, actual
            )));
        }
        log::warn!(
            "RIFF chunk length {} exceeds the {} bytes present, file is truncated",
            declared,
            actual
        );
    }

    Ok(())
}

/// List every subchunk in file order
pub fn list_chunks(bytes: &[u8], options: &DecodeOptions) -> WaveResult<Vec<RawChunk>> {
    check_riff_header(bytes, options)?;
    ChunkScanner::new(bytes, *options).collect()
}

/// RIFF/WAVE container decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerDecoder {
    options: DecodeOptions,
}

impl ContainerDecoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Extract the format header and all data subchunk bytes
    pub fn decode(&self, bytes: &[u8]) -> WaveResult<DecodedContainer> {
        check_riff_header(bytes, &self.options)?;

        let mut fmt_body: Option<Range<usize>> = None;
        let mut data_bodies: Vec<Range<usize>> = Vec::new();

        for chunk in ChunkScanner::new(bytes, self.options) {
            let chunk = chunk?;
            match chunk.id {
                FourCc::FMT => fmt_body = Some(chunk.body),
                FourCc::DATA => {
                    if fmt_body.is_none() {
                        return Err(WaveError::MissingFormatChunk(
                            "A data subchunk was encountered before a format subchunk"
                                .to_string(),
                        ));
                    }
                    data_bodies.push(chunk.body);
                }
                other => log::debug!(
                    "Skipping '{}' subchunk ({} bytes)",
                    other,
                    chunk.declared_size
                ),
            }
        }

        let fmt_body = fmt_body.ok_or_else(|| {
            WaveError::MissingFormatChunk(
                "No format subchunk was found in the wave file".to_string(),
            )
        })?;
        if data_bodies.is_empty() {
            return Err(WaveError::MissingDataChunk);
        }

        let header = FormatHeader::deserialize(&bytes[fmt_body])?;

        let total = data_bodies.iter().map(|r| r.len()).sum();
        let mut data = Vec::with_capacity(total);
        for range in data_bodies {
            data.extend_from_slice(&bytes[range]);
        }

        log::debug!(
            "Decoded {:?} {}ch {}Hz {}-bit, {} data bytes",
            header.sample_format(),
            header.channel_count(),
            header.sample_rate(),
            header.bit_depth().bits(),
            data.len()
        );

        Ok(DecodedContainer { header, data })
    }
}

/// Decode with the given policy
pub fn decode_container(bytes: &[u8], options: &DecodeOptions) -> WaveResult<DecodedContainer> {
    ContainerDecoder::new(*options).decode(bytes)
}
