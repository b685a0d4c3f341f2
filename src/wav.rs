//! WAV encoder: writes the finished buffer as mono PCM using the hound crate.

use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::audio_buffer::SampleBuffer;
use crate::config::Encoding;
use crate::error::{Error, Result};

/// Output is always mono.
pub const CHANNELS: u16 = 1;

/// Container spec for the given encoding and rate.
pub fn wav_spec(encoding: Encoding, sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: CHANNELS,
        sample_rate,
        bits_per_sample: encoding.bits_per_sample(),
        sample_format: encoding.sample_format(),
    }
}

/// Maps a float sample onto the integer code range `[-full_scale - 1, full_scale]`.
/// Out-of-range samples saturate rather than wrap.
pub fn quantize(sample: f64, full_scale: i32) -> i32 {
    let max = f64::from(full_scale);
    (sample * max).round().clamp(-max - 1.0, max) as i32
}

fn encode_into<W: Write + Seek>(
    writer: W,
    buffer: &SampleBuffer,
    encoding: Encoding,
    sample_rate: u32,
    frames: u32,
) -> hound::Result<()> {
    let mut wav = WavWriter::new(writer, wav_spec(encoding, sample_rate))?;
    let samples = buffer.as_slice();
    match encoding.full_scale() {
        None => {
            for &s in samples {
                wav.write_sample(s as f32)?;
            }
        }
        Some(full_scale) => match encoding {
            Encoding::Pcm8 => {
                for &s in samples {
                    wav.write_sample(quantize(s, full_scale) as i8)?;
                }
            }
            Encoding::Pcm16 => {
                let mut block = wav.get_i16_writer(frames);
                for &s in samples {
                    block.write_sample(quantize(s, full_scale) as i16);
                }
                block.flush()?;
            }
            _ => {
                for &s in samples {
                    wav.write_sample(quantize(s, full_scale))?;
                }
            }
        },
    }
    wav.finalize()
}

/// Encodes `buffer` into any seekable writer.
pub fn encode_wav<W: Write + Seek>(
    writer: W,
    buffer: &SampleBuffer,
    encoding: Encoding,
    sample_rate: u32,
) -> Result<()> {
    let frames = encoding.checked_frames(buffer.len())?;
    encode_into(writer, buffer, encoding, sample_rate, frames).map_err(Error::Codec)
}

/// Creates (or truncates) `path` and writes `buffer` into it. The file handle is released
/// on every path, including failures part way through. Buffers too long for a WAV file
/// are rejected before the file is created.
pub fn write_wav(
    path: &Path,
    buffer: &SampleBuffer,
    encoding: Encoding,
    sample_rate: u32,
) -> Result<()> {
    let frames = encoding.checked_frames(buffer.len())?;
    let file = File::create(path).map_err(|e| Error::wav(path, hound::Error::IoError(e)))?;
    encode_into(BufWriter::new(file), buffer, encoding, sample_rate, frames)
        .map_err(|e| Error::wav(path, e))
}

/// Decodes a WAV stream into interleaved f64 samples, inverting [`quantize`] for integer PCM.
pub fn decode_wav<R: Read>(reader: R) -> Result<(WavSpec, Vec<f64>)> {
    let mut wav = WavReader::new(reader)?;
    let spec = wav.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => wav
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<hound::Result<Vec<_>>>()?,
        SampleFormat::Int => {
            let scale = f64::from((1u32 << (spec.bits_per_sample - 1)) - 1);
            wav.samples::<i32>()
                .map(|s| s.map(|v| f64::from(v) / scale))
                .collect::<hound::Result<Vec<_>>>()?
        }
    };
    Ok((spec, samples))
}
