//! tonewav library root. Reads tone specifications, mixes them into a fixed-length
//! buffer, peak-normalizes it and writes a mono WAV file. The binary in `main.rs`
//! wires stdin/stdout and command-line flags into [`render`].

pub mod audio_buffer;
pub mod config;
pub mod error;
pub mod nodes;
pub mod normalize;
pub mod processor;
pub mod tape;
pub mod tone;
pub mod wav;

use std::fmt;
use std::io::{BufRead, Write};

use log::{info, warn};

use crate::audio_buffer::SampleBuffer;
use crate::config::RenderConfig;
use crate::error::Result;
use crate::tone::ToneReader;

pub use crate::error::Error;

pub const BANNER: &str = "Sin Wave Generator";

/// Outcome of one render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSummary {
    /// Tone records accepted from the input.
    pub tones: usize,
    /// Divisor applied during normalization (1.0 when nothing was scaled).
    pub peak: f64,
    /// Frames written.
    pub frames: usize,
    /// Samples still outside [-1, 1] after normalization.
    pub clipped: usize,
}

/// Informational echo to the status sink. The first failed write is logged and turns
/// the echo off; it never fails the render.
struct StatusEcho<'a> {
    out: Option<&'a mut dyn Write>,
}

impl<'a> StatusEcho<'a> {
    fn new(out: &'a mut dyn Write) -> Self {
        Self { out: Some(out) }
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Some(out) = self.out.as_mut() {
            if let Err(e) = writeln!(out, "{args}") {
                warn!("status output disabled: {e}");
                self.out = None;
            }
        }
    }

    fn flush(&mut self) {
        if let Some(out) = self.out.as_mut() {
            if let Err(e) = out.flush() {
                warn!("status output disabled: {e}");
                self.out = None;
            }
        }
    }
}

/// Allocates the buffer and mixes every tone read from `input` into it, echoing each
/// accepted record to `status`. Stops at end of input or at the first malformed record.
/// Returns the un-normalized buffer and the number of tones mixed. A failing `status`
/// writer only stops the echo.
pub fn synthesize<R: BufRead>(
    config: &RenderConfig,
    input: R,
    status: &mut dyn Write,
) -> Result<(SampleBuffer, usize)> {
    synthesize_with(config, input, &mut StatusEcho::new(status))
}

fn synthesize_with<R: BufRead>(
    config: &RenderConfig,
    input: R,
    echo: &mut StatusEcho<'_>,
) -> Result<(SampleBuffer, usize)> {
    let mut buffer = SampleBuffer::new(config.frames);
    let mut count = 0;
    for tone in ToneReader::new(input) {
        let tone = tone?;
        echo.line(format_args!("{tone}"));
        nodes::accumulate(&mut buffer, &tone, config.sample_rate, config.waveform);
        count += 1;
    }
    info!("mixed {} tone(s) into {} frames", count, buffer.len());
    Ok((buffer, count))
}

/// Runs the whole pipeline: banner, accumulate, normalize, encode to `config.output`.
pub fn render<R: BufRead>(
    config: &RenderConfig,
    input: R,
    status: &mut dyn Write,
) -> Result<RenderSummary> {
    config.validate()?;
    let mut echo = StatusEcho::new(status);
    echo.line(format_args!("\n{BANNER}\n"));

    let (mut buffer, tones) = synthesize_with(config, input, &mut echo)?;
    echo.flush();

    let peak = normalize::normalize(&mut buffer, config.normalize);
    info!("normalized with peak {peak} ({:?})", config.normalize);
    let clipped = normalize::count_clipped(&buffer);
    if clipped > 0 {
        warn!("{clipped} sample(s) exceed full scale and will clip");
    }

    wav::write_wav(&config.output, &buffer, config.encoding, config.sample_rate)?;
    info!(
        "wrote {} ({} frames, {:.3}s, {:?})",
        config.output.display(),
        buffer.len(),
        config.duration_secs(),
        config.encoding
    );

    Ok(RenderSummary {
        tones,
        peak,
        frames: buffer.len(),
        clipped,
    })
}

#[cfg(test)]
mod tests {
    use super::{render, synthesize};
    use crate::config::{Encoding, NormalizeMode, RenderConfig};
    use crate::error::Error;
    use std::f64::consts::PI;
    use std::io::{self, Cursor, Write};
    use std::path::Path;
    use tempfile::tempdir;

    /// Status sink whose reader went away, like stdout piped into `head`.
    struct ClosedPipe {
        writes: usize,
    }

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    fn small_config(output: &Path) -> RenderConfig {
        RenderConfig {
            frames: 4_410,
            output: output.to_path_buf(),
            ..RenderConfig::default()
        }
    }

    fn decode(path: &Path) -> Vec<i16> {
        let mut reader = hound::WavReader::open(path).unwrap();
        reader.samples::<i16>().map(|s| s.unwrap()).collect()
    }

    #[test]
    /// Test that empty input produces a buffer of zeros and a file of silence.
    fn test_empty_input_writes_silence() {
        let dir = tempdir().unwrap();
        let config = small_config(&dir.path().join("sin.wav"));

        let (buffer, tones) = synthesize(&config, Cursor::new(""), &mut io::sink()).unwrap();
        assert_eq!(tones, 0);
        assert!(buffer.as_slice().iter().all(|&x| x == 0.0));

        let summary = render(&config, Cursor::new(""), &mut io::sink()).unwrap();
        assert_eq!(summary.tones, 0);
        assert_eq!(summary.peak, 1.0);
        assert_eq!(summary.frames, 4_410);
        let samples = decode(&config.output);
        assert_eq!(samples.len(), 4_410);
        assert!(samples.iter().all(|&s| s == 0));
    }

    #[test]
    /// Test the banner and one echo line per accepted record.
    fn test_status_output() {
        let dir = tempdir().unwrap();
        let config = small_config(&dir.path().join("sin.wav"));
        let mut status = Vec::new();

        render(&config, Cursor::new("440 0 100\n493.88 50 10\nstop\n"), &mut status).unwrap();

        let text = String::from_utf8(status).unwrap();
        assert_eq!(
            text,
            "\nSin Wave Generator\n\n\
             440.000000 Hz\t0 offset\t100 duration\n\
             493.880000 Hz\t50 offset\t10 duration\n"
        );
    }

    #[test]
    /// Test that a broken status sink neither fails the render nor skips writing the file.
    fn test_failing_status_output_still_writes_file() {
        let dir = tempdir().unwrap();
        let config = small_config(&dir.path().join("piped.wav"));
        let mut status = ClosedPipe { writes: 0 };

        let summary = render(&config, Cursor::new("440 0 10 880 10 10"), &mut status).unwrap();

        assert_eq!(summary.tones, 2);
        assert_eq!(status.writes, 1, "echo should stop after the first failure");
        assert!(config.output.exists());
        let samples = decode(&config.output);
        assert_eq!(samples.len(), 4_410);
        assert!(samples[..20].iter().any(|&s| s != 0));
    }

    #[test]
    /// Test that a single full-length tone survives the pipeline within 16-bit error.
    fn test_single_tone_end_to_end() {
        let dir = tempdir().unwrap();
        let config = small_config(&dir.path().join("a440.wav"));

        let summary = render(&config, Cursor::new("440 0 4410"), &mut io::sink()).unwrap();
        assert_eq!(summary.tones, 1);
        assert_eq!(summary.peak, 1.0);
        assert_eq!(summary.clipped, 0);

        let samples = decode(&config.output);
        assert_eq!(samples.len(), 4_410);
        for (s, &code) in samples.iter().enumerate() {
            let expected = ((2.0 * PI * 440.0) * (s as f64 / 44_100.0)).sin();
            let decoded = f64::from(code) / 32_767.0;
            assert!((decoded - expected).abs() <= 1.0 / 32_768.0, "sample {s}");
        }
    }

    #[test]
    /// Test that stacked tones are scaled down by the positive peak.
    fn test_chord_is_normalized() {
        let dir = tempdir().unwrap();
        let config = small_config(&dir.path().join("chord.wav"));
        let input = "440 0 4410 554.37 0 4410 659.26 0 4410";

        let summary = render(&config, Cursor::new(input), &mut io::sink()).unwrap();
        assert_eq!(summary.tones, 3);
        assert!(summary.peak > 1.0 && summary.peak <= 3.0);
        let max = decode(&config.output).into_iter().max().unwrap();
        assert_eq!(max, i16::MAX);
    }

    #[test]
    fn test_absolute_peak_prevents_clipping() {
        let dir = tempdir().unwrap();
        let config = RenderConfig {
            normalize: NormalizeMode::AbsolutePeak,
            encoding: Encoding::Pcm24,
            ..small_config(&dir.path().join("abs.wav"))
        };
        let input = "440 0 4410 440 0 4410";

        let summary = render(&config, Cursor::new(input), &mut io::sink()).unwrap();
        assert!(summary.peak > 1.0);
        assert_eq!(summary.clipped, 0);
        let reader = hound::WavReader::open(&config.output).unwrap();
        assert_eq!(reader.spec().bits_per_sample, 24);
    }

    #[test]
    fn test_out_of_range_tones_do_not_panic() {
        let dir = tempdir().unwrap();
        let config = small_config(&dir.path().join("edge.wav"));
        let input = "440 -1000 500\n440 4400 1000\n440 9000 10\n440 10 -10\n";

        let summary = render(&config, Cursor::new(input), &mut io::sink()).unwrap();
        assert_eq!(summary.tones, 4);
        let samples = decode(&config.output);
        assert!(samples[..4_400].iter().all(|&s| s == 0));
        assert!(samples[4_400..].iter().any(|&s| s != 0));
    }

    #[test]
    fn test_invalid_config_fails_before_writing() {
        let dir = tempdir().unwrap();
        let config = RenderConfig {
            sample_rate: 0,
            ..small_config(&dir.path().join("never.wav"))
        };
        let err = render(&config, Cursor::new("440 0 10"), &mut io::sink()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(!config.output.exists());
    }
}
