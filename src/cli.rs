use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{
    parse_bit_depth, parse_sample_format, parse_speaker_mask, DecodeOptions, EncodeOptions,
};
use crate::wave::{self, FourCc};

/// Inspect, repair and convert WAV files
#[derive(Parser, Debug)]
#[command(name = "wave-codec")]
#[command(version)]
#[command(about = "RIFF/WAVE inspection, repair and conversion", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the format header and chunk layout of a file
    Info {
        file: PathBuf,

        /// Reject damaged length fields instead of working around them
        #[arg(long)]
        strict: bool,
    },

    /// Rewrite a damaged file with consistent size fields
    Repair { input: PathBuf, output: PathBuf },

    /// Re-encode the samples of a file to another format or bit depth
    Convert {
        input: PathBuf,
        output: PathBuf,

        /// Target bit depth (8, 16, 24, 32, 64)
        #[arg(short, long, value_name = "BITS")]
        bits: Option<String>,

        /// Target sample format (pcm, float, alaw, mulaw)
        #[arg(short, long, value_name = "FORMAT")]
        format: Option<String>,

        /// Speaker mask for extensible output, decimal or 0x hex
        #[arg(long = "speaker-mask", value_name = "MASK")]
        speaker_mask: Option<String>,

        /// Reject damaged length fields instead of working around them
        #[arg(long)]
        strict: bool,
    },
}

fn decode_options(strict: bool) -> DecodeOptions {
    if strict {
        DecodeOptions::strict()
    } else {
        DecodeOptions::default()
    }
}

/// Build encode options from the convert arguments, keeping the source
/// speaker mask unless one is given
fn encode_options(
    bits: Option<&str>,
    format: Option<&str>,
    speaker_mask: Option<&str>,
    source_mask: u32,
) -> Result<EncodeOptions> {
    let mut opts = EncodeOptions {
        speaker_mask: source_mask,
        ..EncodeOptions::default()
    };
    if let Some(bits) = bits {
        opts.bit_depth = parse_bit_depth(bits)?;
    }
    if let Some(format) = format {
        opts.sample_format = parse_sample_format(format)?;
    }
    if let Some(mask) = speaker_mask {
        opts.speaker_mask = parse_speaker_mask(mask)?;
    }
    Ok(opts)
}

/// Human-readable summary of a file's header and chunks
pub fn describe(bytes: &[u8], options: &DecodeOptions) -> Result<String> {
    let decoded = wave::decode_to_buffer(bytes, options).context("Failed to decode wave data")?;
    let chunks = wave::list_chunks(bytes, options).context("Failed to list chunks")?;
    let header = &decoded.header;

    let mut out = String::new();
    writeln!(out, "format:       {:?}", header.sample_format())?;
    writeln!(out, "channels:     {}", header.channel_count())?;
    writeln!(out, "sample rate:  {} Hz", header.sample_rate())?;
    writeln!(out, "bit depth:    {}", header.bit_depth().bits())?;
    writeln!(out, "block align:  {}", header.block_align())?;
    writeln!(out, "byte rate:    {}", header.byte_rate())?;
    writeln!(out, "speaker mask: 0x{:08X}", header.speaker_mask())?;
    writeln!(out, "frames:       {}", decoded.frame_count())?;
    writeln!(
        out,
        "duration:     {:.3} s",
        decoded.frame_count() as f64 / f64::from(header.sample_rate())
    )?;
    writeln!(out, "data bytes:   {}", decoded.data.len())?;
    writeln!(out, "chunks:")?;
    for chunk in &chunks {
        let note = if chunk.body.len() as u64 != u64::from(chunk.declared_size) {
            format!(" (declared {})", chunk.declared_size)
        } else {
            String::new()
        };
        let marker = if chunk.id == FourCc::DATA || chunk.id == FourCc::FMT {
            ""
        } else {
            " [skipped]"
        };
        writeln!(
            out,
            "  '{}' at {}: {} bytes{}{}",
            chunk.id,
            chunk.body.start - 8,
            chunk.body.len(),
            note,
            marker
        )?;
    }
    Ok(out)
}

/// Execute the parsed command line
pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Info { file, strict } => {
            let bytes =
                fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
            print!("{}", describe(&bytes, &decode_options(*strict))?);
        }
        Command::Repair { input, output } => {
            let bytes =
                fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
            let repaired = wave::repair(&bytes)
                .with_context(|| format!("Failed to repair {}", input.display()))?;
            fs::write(output, &repaired)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            log::info!(
                "Repaired {} -> {} ({} bytes)",
                input.display(),
                output.display(),
                repaired.len()
            );
        }
        Command::Convert {
            input,
            output,
            bits,
            format,
            speaker_mask,
            strict,
        } => {
            let bytes =
                fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
            let source = wave::decode_to_buffer(&bytes, &decode_options(*strict))
                .with_context(|| format!("Failed to decode {}", input.display()))?;
            let opts = encode_options(
                bits.as_deref(),
                format.as_deref(),
                speaker_mask.as_deref(),
                source.header.speaker_mask(),
            )?;
            let header = &source.header;
            let channels = wave::buffer_to_float32_channels(
                &source.data,
                usize::from(header.channel_count()),
                header.sample_format(),
                header.bit_depth(),
            )
            .with_context(|| format!("Failed to convert samples of {}", input.display()))?;
            let encoded = wave::encode_from_channels(&channels, header.sample_rate(), &opts)
                .context("Failed to encode converted samples")?;
            fs::write(output, &encoded)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            log::info!(
                "Converted {} to {:?} {}-bit",
                input.display(),
                opts.sample_format,
                opts.bit_depth.bits()
            );
        }
    }
    Ok(())
}
