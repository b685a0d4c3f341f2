//! Tone sources and the accumulator that mixes a [`ToneSpec`] into the buffer.

use std::f64::consts::PI;
use std::ops::Range;

use crate::audio_buffer::SampleBuffer;
use crate::config::Waveform;
use crate::processor::Processor;
use crate::tone::ToneSpec;

/// Fixed amplitude for every tone.
pub const AMPLITUDE: f64 = 1.0;

/// Generates a unit-amplitude periodic wave. Stateless: the value at sample `s` depends
/// only on `s`, so clipped windows keep the phase they would have had.
#[derive(Clone, Debug, PartialEq)]
pub struct Oscillator {
    /// Frequency in Hz (e.g. 440.0).
    pub frequency_hz: f64,
    /// Sample rate in Hz. Must match the buffer.
    pub sample_rate: u32,
    pub waveform: Waveform,
}

impl Oscillator {
    pub fn new(frequency_hz: f64, sample_rate: u32, waveform: Waveform) -> Self {
        Self {
            frequency_hz,
            sample_rate,
            waveform,
        }
    }

    /// Value of the wave at absolute sample index `s`.
    pub fn sample_at(&self, s: usize) -> f64 {
        let rate = f64::from(self.sample_rate);
        match self.waveform {
            Waveform::Sine => AMPLITUDE * ((2.0 * PI * self.frequency_hz) * (s as f64 / rate)).sin(),
            Waveform::Square => {
                // Cycles elapsed; multiplying first keeps whole-sample periods exact.
                let phase = (self.frequency_hz * s as f64 / rate).rem_euclid(1.0);
                if phase < 0.5 {
                    -AMPLITUDE
                } else {
                    AMPLITUDE
                }
            }
        }
    }
}

impl Processor for Oscillator {
    fn process(&mut self, start: usize, output: &mut [f64]) {
        for (i, sample) in output.iter_mut().enumerate() {
            *sample += self.sample_at(start + i);
        }
    }
}

/// Adds `tone` into `buffer`, touching only the clamped window. Returns the window written.
pub fn accumulate(
    buffer: &mut SampleBuffer,
    tone: &ToneSpec,
    sample_rate: u32,
    waveform: Waveform,
) -> Range<usize> {
    let window = tone.window(buffer.len());
    if !window.is_empty() {
        let mut osc = Oscillator::new(tone.frequency, sample_rate, waveform);
        osc.process(window.start, &mut buffer.as_mut_slice()[window.clone()]);
    }
    window
}
