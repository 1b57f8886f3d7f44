//! WAV (RIFF/WAVE) encoding, decoding and repair
//!
//! The `wave` module holds the codec itself. `config` carries the decode
//! tolerance policy and encode target, `cli` and `logging` back the
//! `wave-codec` binary.

pub mod cli;
pub mod config;
pub mod logging;
pub mod wave;

pub use config::{DecodeOptions, EncodeOptions};
pub use wave::{
    decode_to_buffer, decode_to_channels, encode_from_buffer, encode_from_channels, repair,
    BitDepth, DecodedAudio, FormatHeader, SampleFormat, WaveError, WaveResult,
};
