//! Little-endian field access over byte buffers
//!
//! `BinaryCursor` reads and writes fixed-width little-endian integers and
//! 4-byte ASCII chunk tags at absolute offsets. Writes take a wide value and
//! refuse to truncate it.

use std::fmt;

use super::error::{WaveError, WaveResult};

/// Byte order of the host, fixed at compile time.
///
/// All field access goes through `from_le_bytes`/`to_le_bytes`, so the value
/// only matters to callers that reinterpret memory themselves.
pub const NATIVE_LITTLE_ENDIAN: bool = cfg!(target_endian = "little");

/// A 4-byte RIFF chunk identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    pub const RIFF: FourCc = FourCc(*b"RIFF");
    pub const WAVE: FourCc = FourCc(*b"WAVE");
    pub const FMT: FourCc = FourCc(*b"fmt ");
    pub const DATA: FourCc = FourCc(*b"data");

    /// Build a tag from a 4-character ASCII string
    pub fn new(tag: &str) -> WaveResult<Self> {
        let mut bytes = [0u8; 4];
        let count = tag.chars().count();
        if count != 4 {
            return Err(WaveError::InvalidTagLength(count));
        }
        for (index, ch) in tag.chars().enumerate() {
            if !ch.is_ascii() {
                return Err(WaveError::InvalidAscii { ch, index });
            }
            bytes[index] = ch as u8;
        }
        Ok(FourCc(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for FourCc {
    // Single-byte decode: every byte maps to the Latin-1 code point of the
    // same value, so arbitrary tags from damaged files still print.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", char::from(b))?;
        }
        Ok(())
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc({:?})", self.to_string())
    }
}

/// Cursor over a byte buffer addressed by absolute offsets
#[derive(Debug)]
pub struct BinaryCursor<B> {
    buf: B,
}

impl<B: AsRef<[u8]>> BinaryCursor<B> {
    pub fn new(buf: B) -> Self {
        Self { buf }
    }

    pub fn len(&self) -> usize {
        self.buf.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_inner(self) -> B {
        self.buf
    }

    fn field<const N: usize>(&self, offset: usize) -> WaveResult<[u8; N]> {
        let bytes = self.buf.as_ref();
        offset
            .checked_add(N)
            .and_then(|end| bytes.get(offset..end))
            .map(|slice| {
                let mut out = [0u8; N];
                out.copy_from_slice(slice);
                out
            })
            .ok_or(WaveError::UnexpectedEnd {
                offset,
                needed: N,
                len: bytes.len(),
            })
    }

    /// Read a little-endian u16
    pub fn read_u16_le(&self, offset: usize) -> WaveResult<u16> {
        self.field::<2>(offset).map(u16::from_le_bytes)
    }

    /// Read a little-endian u32
    pub fn read_u32_le(&self, offset: usize) -> WaveResult<u32> {
        self.field::<4>(offset).map(u32::from_le_bytes)
    }

    /// Read a 4-byte chunk tag
    pub fn read_tag(&self, offset: usize) -> WaveResult<FourCc> {
        self.field::<4>(offset).map(FourCc)
    }

    /// Read `N` raw bytes
    pub fn read_bytes<const N: usize>(&self, offset: usize) -> WaveResult<[u8; N]> {
        self.field::<N>(offset)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> BinaryCursor<B> {
    fn put(&mut self, offset: usize, src: &[u8]) -> WaveResult<()> {
        let len = self.len();
        let dst = offset
            .checked_add(src.len())
            .and_then(|end| self.buf.as_mut().get_mut(offset..end))
            .ok_or(WaveError::UnexpectedEnd {
                offset,
                needed: src.len(),
                len,
            })?;
        dst.copy_from_slice(src);
        Ok(())
    }

    /// Write `value` as a little-endian u16, failing if it does not fit
    pub fn write_u16_le(&mut self, offset: usize, value: u64) -> WaveResult<()> {
        let narrow =
            u16::try_from(value).map_err(|_| WaveError::OutOfRangeValue { value, bits: 16 })?;
        self.put(offset, &narrow.to_le_bytes())
    }

    /// Write `value` as a little-endian u32, failing if it does not fit
    pub fn write_u32_le(&mut self, offset: usize, value: u64) -> WaveResult<()> {
        let narrow =
            u32::try_from(value).map_err(|_| WaveError::OutOfRangeValue { value, bits: 32 })?;
        self.put(offset, &narrow.to_le_bytes())
    }

    /// Write a 4-character ASCII tag
    pub fn write_tag(&mut self, offset: usize, tag: &str) -> WaveResult<()> {
        let tag = FourCc::new(tag)?;
        self.put(offset, &tag.0)
    }

    /// Copy raw bytes in at `offset`
    pub fn write_bytes(&mut self, offset: usize, src: &[u8]) -> WaveResult<()> {
        self.put(offset, src)
    }
}
