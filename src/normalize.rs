//! Peak normalization.

use crate::audio_buffer::SampleBuffer;
use crate::config::NormalizeMode;

/// The scale never drops below unity, so quiet buffers are left as they are.
pub const PEAK_FLOOR: f64 = 1.0;

/// Divisor the buffer will be scaled by under `mode`.
pub fn peak(buffer: &SampleBuffer, mode: NormalizeMode) -> f64 {
    let observed = match mode {
        NormalizeMode::PositivePeak => buffer.max(),
        NormalizeMode::AbsolutePeak => buffer.max_abs(),
        NormalizeMode::Off => None,
    };
    observed.map_or(PEAK_FLOOR, |p| p.max(PEAK_FLOOR))
}

/// Divides every sample by the peak for `mode` and returns the peak used.
pub fn normalize(buffer: &mut SampleBuffer, mode: NormalizeMode) -> f64 {
    let peak = peak(buffer, mode);
    if peak != PEAK_FLOOR {
        for sample in buffer.as_mut_slice() {
            *sample /= peak;
        }
    }
    peak
}

/// Number of samples outside `[-1, 1]`. They clip when quantized to integer PCM.
pub fn count_clipped(buffer: &SampleBuffer) -> usize {
    buffer.as_slice().iter().filter(|s| s.abs() > 1.0).count()
}
