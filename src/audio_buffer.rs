//! Fixed-size sample buffer. Allocated once per render; never resized.

/// Fixed-length buffer of f64 samples, one channel.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBuffer {
    storage: Box<[f64]>,
}

impl SampleBuffer {
    /// Creates a new buffer with the given frame count. Contents are zeroed.
    pub fn new(frame_count: usize) -> Self {
        let storage: Box<[f64]> = vec![0.0f64; frame_count].into_boxed_slice();
        SampleBuffer { storage }
    }

    /// Returns the number of samples (frames) in the buffer.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Mutable slice of the buffer for writing samples.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.storage
    }

    /// Immutable slice of the buffer for reading samples.
    pub fn as_slice(&self) -> &[f64] {
        &self.storage
    }

    /// Largest sample value, or `None` for an empty buffer. Negative samples only win
    /// when every sample is negative.
    pub fn max(&self) -> Option<f64> {
        self.storage.iter().copied().reduce(f64::max)
    }

    /// Largest absolute sample value, or `None` for an empty buffer.
    pub fn max_abs(&self) -> Option<f64> {
        self.storage.iter().map(|s| s.abs()).reduce(f64::max)
    }
}

impl From<Vec<f64>> for SampleBuffer {
    fn from(samples: Vec<f64>) -> Self {
        SampleBuffer {
            storage: samples.into_boxed_slice(),
        }
    }
}
