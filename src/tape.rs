//! MSX cassette encoder. Bits are square pulses: a 0 is one pulse at the baud
//! frequency, a 1 is two pulses at twice that. Bytes are framed with one start bit
//! and two stop bits, and blocks are preceded by a header tone.

use std::path::Path;

use log::{debug, info};

use crate::audio_buffer::SampleBuffer;
use crate::config::{Encoding, Waveform};
use crate::error::{Error, Result};
use crate::nodes::{Oscillator, AMPLITUDE};
use crate::processor::Processor;
use crate::wav;

pub const DEFAULT_BAUD: f64 = 1200.0;
pub const DEFAULT_TAPE_OUTPUT: &str = "tape.wav";

/// Header pulses per 1200 baud. Scales linearly with the baud rate.
const SHORT_HEADER_PULSES_AT_1200: f64 = 4000.0;

/// One pulse: `low` samples at the bottom of the range, the rest at the top.
struct Pulse {
    low: usize,
}

impl Processor for Pulse {
    fn process(&mut self, start: usize, output: &mut [f64]) {
        for (i, sample) in output.iter_mut().enumerate() {
            *sample += if start + i < self.low {
                -AMPLITUDE
            } else {
                AMPLITUDE
            };
        }
    }
}

fn round_half_even(x: f64) -> i64 {
    x.round_ties_even() as i64
}

/// Growable sample stream in the cassette's pulse encoding.
#[derive(Clone, Debug)]
pub struct TapeEncoder {
    sample_rate: u32,
    samples: Vec<f64>,
}

impl TapeEncoder {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_buffer(self) -> SampleBuffer {
        SampleBuffer::from(self.samples)
    }

    /// Appends `processor` rendered over `len` fresh samples.
    fn append(&mut self, len: usize, processor: &mut dyn Processor) {
        let start = self.samples.len();
        self.samples.resize(start + len, 0.0);
        processor.process(0, &mut self.samples[start..]);
    }

    /// Appends `secs` seconds of square wave. Phase restarts at the first new sample.
    pub fn add_tone(&mut self, freq: f64, secs: f64) {
        let len = (secs * f64::from(self.sample_rate)) as usize;
        let mut osc = Oscillator::new(freq, self.sample_rate, Waveform::Square);
        self.append(len, &mut osc);
    }

    /// Appends one pulse at `freq`. Pulse edges sit on the `freq` grid measured from the
    /// start of the stream, so a run of pulses never drifts.
    pub fn add_bit_0(&mut self, freq: f64) {
        if !(freq.is_finite() && freq > 0.0) {
            debug!("skipping pulse at {freq} Hz");
            return;
        }
        let per_pulse = f64::from(self.sample_rate) / freq;
        let pulse = round_half_even(self.samples.len() as f64 / per_pulse) as f64;
        let start = round_half_even(pulse * per_pulse);
        let half = round_half_even((pulse + 0.5) * per_pulse);
        let end = round_half_even((pulse + 1.0) * per_pulse);
        let low = (half - start).max(0) as usize;
        let high = (end - half).max(0) as usize;
        self.append(low + high, &mut Pulse { low });
    }

    pub fn add_bit_1(&mut self, freq: f64) {
        self.add_bit_0(freq * 2.0);
        self.add_bit_0(freq * 2.0);
    }

    /// Start bit 0, eight data bits LSB first, then two stop bits 1.
    pub fn add_byte(&mut self, freq: f64, byte: u8) {
        self.add_bit_0(freq);
        for i in 0..8 {
            if (byte >> i) & 1 == 0 {
                self.add_bit_0(freq);
            } else {
                self.add_bit_1(freq);
            }
        }
        self.add_bit_1(freq);
        self.add_bit_1(freq);
    }

    /// About 1.7 s of pulses at twice `freq` (4000 pulses at 1200 baud).
    pub fn add_short_header(&mut self, freq: f64) {
        let pulses = round_half_even(freq * SHORT_HEADER_PULSES_AT_1200 / 1200.0).max(0);
        for _ in 0..pulses {
            self.add_bit_0(freq * 2.0);
        }
    }

    /// Four short headers back to back.
    pub fn add_long_header(&mut self, freq: f64) {
        for _ in 0..4 {
            self.add_short_header(freq);
        }
    }

    /// A long header followed by `data`.
    pub fn add_block(&mut self, freq: f64, data: &[u8]) {
        self.add_long_header(freq);
        for &byte in data {
            self.add_byte(freq, byte);
        }
    }
}

/// Encodes `data` as one tape block and writes it to `path`. Returns the frame count.
pub fn write_tape(
    path: &Path,
    data: &[u8],
    baud: f64,
    sample_rate: u32,
    encoding: Encoding,
) -> Result<usize> {
    if sample_rate == 0 {
        return Err(Error::InvalidConfig("sample rate must be > 0".into()));
    }
    if !(baud.is_finite() && baud > 0.0) {
        return Err(Error::InvalidConfig(format!("baud rate must be > 0, got {baud}")));
    }
    let mut tape = TapeEncoder::new(sample_rate);
    tape.add_block(baud, data);
    let frames = tape.len();
    wav::write_wav(path, &tape.into_buffer(), encoding, sample_rate)?;
    info!(
        "wrote {} bytes at {} baud to {} ({} frames)",
        data.len(),
        baud,
        path.display(),
        frames
    );
    Ok(frames)
}
