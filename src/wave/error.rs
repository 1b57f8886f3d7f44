//! Error type for WAV container and sample conversion operations
//!
//! Every failure is fatal to the call that raised it: no operation returns a
//! partial result alongside an error.

use super::format::SampleFormat;

/// Error type for wave codec operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WaveError {
    /// Missing "RIFF" tag at offset 0 or "WAVE" tag at offset 8
    #[error("Not a wave file: {0}")]
    NotAWaveFile(String),

    /// A RIFF or subchunk length field disagrees with the buffer
    #[error("Corrupt chunk size: {0}")]
    CorruptChunkSize(String),

    /// No fmt subchunk, or a data subchunk preceding it
    #[error("Missing format chunk: {0}")]
    MissingFormatChunk(String),

    /// No data subchunk in the file
    #[error("No data subchunks were found in the wave file")]
    MissingDataChunk,

    /// Format id not one of PCM, IEEE float, A-law, µ-law
    #[error("Unsupported sample format id {0:#06x}")]
    UnsupportedSampleFormat(u16),

    /// Bit depth not allowed for the sample format
    #[error("{format:?} audio has a bit depth of {bits}, which is not supported")]
    UnsupportedBitDepth { format: SampleFormat, bits: u16 },

    /// Extensible fmt chunk carries an unknown subformat GUID
    #[error("Unsupported format GUID in extensible format chunk: {}", hex(.0))]
    UnsupportedGuid([u8; 16]),

    /// Sample format has no GUID to write into an extensible fmt chunk
    #[error("Extensible format is not supported for sample format {0:?}")]
    UnsupportedExtensible(SampleFormat),

    /// No conversion exists for this sample format and bit depth pair
    #[error("Unsupported combination: {format:?} at {bits} bits")]
    UnsupportedCombination { format: SampleFormat, bits: u16 },

    /// Channel count of zero
    #[error("Invalid channel count: {0}")]
    InvalidChannelCount(usize),

    /// Sample rate of zero
    #[error("Invalid sample rate: 0 Hz")]
    InvalidSampleRate,

    /// Interleave was given no channels
    #[error("Empty channel array received")]
    EmptyChannelSet,

    /// Channels passed to interleave differ in length
    #[error("Channel {channel} has {actual} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    /// Buffer length is not a multiple of the group size
    #[error("Length {len} is not a multiple of {divisor}")]
    NotDivisible { len: usize, divisor: usize },

    /// Value does not fit the target integer width
    #[error("Value {value} is outside the range of a {bits}-bit unsigned integer")]
    OutOfRangeValue { value: u64, bits: u32 },

    /// Tag character cannot be encoded as ASCII
    #[error("Character {ch:?} at offset {index} can't be encoded as ASCII")]
    InvalidAscii { ch: char, index: usize },

    /// Chunk tags are exactly four characters
    #[error("Chunk tag must be 4 characters, got {0}")]
    InvalidTagLength(usize),

    /// Read past the end of the buffer
    #[error("Unexpected end of buffer: need {needed} bytes at offset {offset}, buffer has {len}")]
    UnexpectedEnd {
        offset: usize,
        needed: usize,
        len: usize,
    },
}

/// Result type for wave codec operations
pub type WaveResult<T> = Result<T, WaveError>;

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
