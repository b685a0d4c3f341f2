//! Render configuration. Defaults reproduce the classic `sin.wav` renderer:
//! one million frames of mono 16-bit audio at 44.1 kHz.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::error::{Error, Result};

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_FRAME_COUNT: usize = 1_000_000;
pub const DEFAULT_OUTPUT: &str = "sin.wav";

/// Largest 24-bit sample code.
pub const PCM24_MAX: i32 = (1 << 23) - 1;

/// Sample encoding written to the WAV container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Encoding {
    /// 8-bit integer PCM (stored unsigned, as WAV requires).
    Pcm8,
    /// 16-bit integer PCM.
    #[default]
    Pcm16,
    /// 24-bit integer PCM.
    Pcm24,
    /// 32-bit IEEE float.
    Float32,
}

impl Encoding {
    pub fn bits_per_sample(self) -> u16 {
        match self {
            Encoding::Pcm8 => 8,
            Encoding::Pcm16 => 16,
            Encoding::Pcm24 => 24,
            Encoding::Float32 => 32,
        }
    }

    pub fn sample_format(self) -> hound::SampleFormat {
        match self {
            Encoding::Float32 => hound::SampleFormat::Float,
            _ => hound::SampleFormat::Int,
        }
    }

    /// Largest positive integer code for integer encodings; `None` for float.
    pub fn full_scale(self) -> Option<i32> {
        match self {
            Encoding::Pcm8 => Some(i8::MAX as i32),
            Encoding::Pcm16 => Some(i16::MAX as i32),
            Encoding::Pcm24 => Some(PCM24_MAX),
            Encoding::Float32 => None,
        }
    }

    /// `frames` as hound's `u32` sample count, provided the data chunk still fits the
    /// 32-bit RIFF length field at this width.
    pub fn checked_frames(self, frames: usize) -> Result<u32> {
        let bytes_per_frame = u64::from(self.bits_per_sample() / 8);
        match u32::try_from(frames) {
            Ok(n) if u64::from(n) * bytes_per_frame <= u64::from(u32::MAX) => Ok(n),
            _ => Err(Error::InvalidConfig(format!(
                "{} frames do not fit in a WAV file at {} bits",
                frames,
                self.bits_per_sample()
            ))),
        }
    }
}

/// How the peak used for normalization is found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum NormalizeMode {
    /// Divide by `max(1.0, largest sample)`. Negative excursions never set the scale.
    #[default]
    #[value(name = "positive")]
    PositivePeak,
    /// Divide by `max(1.0, largest |sample|)`.
    #[value(name = "absolute")]
    AbsolutePeak,
    /// Leave samples as accumulated.
    Off,
}

/// Shape each tone is rendered with. Amplitude is always 1.0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Waveform {
    #[default]
    Sine,
    /// Low for the first half of each period, high for the second.
    Square,
}

/// Everything the pipeline needs to know before it allocates the buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Buffer length in frames. Fixed for the whole render.
    pub frames: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Output WAV path.
    pub output: PathBuf,
    pub encoding: Encoding,
    pub normalize: NormalizeMode,
    pub waveform: Waveform,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frames: DEFAULT_FRAME_COUNT,
            sample_rate: DEFAULT_SAMPLE_RATE,
            output: PathBuf::from(DEFAULT_OUTPUT),
            encoding: Encoding::default(),
            normalize: NormalizeMode::default(),
            waveform: Waveform::default(),
        }
    }
}

impl RenderConfig {
    /// Rejects configurations that cannot produce a valid file.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidConfig("sample rate must be > 0".into()));
        }
        if self.frames == 0 {
            return Err(Error::InvalidConfig("frame count must be > 0".into()));
        }
        self.encoding.checked_frames(self.frames)?;
        Ok(())
    }

    /// Duration of the rendered file in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / f64::from(self.sample_rate)
    }
}
