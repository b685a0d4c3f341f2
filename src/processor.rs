//! Source interface. Every tone shape rendered into the sample buffer implements this trait.

/// A signal source that mixes itself into a region of the sample buffer.
pub trait Processor {
    /// Add this source's samples into `output`. `start` is the absolute buffer index of
    /// `output[0]`, so phase is continuous no matter where the region begins.
    fn process(&mut self, start: usize, output: &mut [f64]);
}
