//! WAV (RIFF/WAVE) codec
//!
//! Reads and writes WAV files byte-exactly and converts between normalized
//! float32 channels and the stored sample representations.
//!
//! # Architecture
//!
//! - `binary` provides little-endian field and chunk tag access
//! - `format` models the fmt subchunk, its formats, bit depths and GUIDs
//! - `decoder` walks RIFF subchunks under a configurable tolerance policy
//! - `encoder` assembles RIFF/WAVE/fmt/data output
//! - `convert` interleaves channels and quantizes samples
//! - `g711` implements A-law and µ-law companding
//! - `codec` ties the above into channel-level encode, decode and repair

pub mod binary;
pub mod codec;
pub mod convert;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
pub mod g711;

pub use binary::{BinaryCursor, FourCc, NATIVE_LITTLE_ENDIAN};
pub use codec::{
    decode_to_buffer, decode_to_channels, encode_from_buffer, encode_from_channels, repair,
    DecodedAudio,
};
pub use convert::{
    buffer_to_float32_channels, deinterleave, float32_channels_to_buffer, interleave,
};
pub use decoder::{
    decode_container, list_chunks, ChunkScanner, ContainerDecoder, DecodedContainer, RawChunk,
};
pub use encoder::encode_container;
pub use error::{WaveError, WaveResult};
pub use format::{BitDepth, FormatHeader, SampleFormat, EXTENSIBLE_FORMAT_ID};
