//! Error types for the render pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for render operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering tones to a WAV file.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading the tone list or the tape payload failed.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// Creating, writing or finalizing the output file failed.
    #[error("failed to write output file '{}': {source}", .path.display())]
    Wav {
        /// Output path.
        path: PathBuf,
        /// Underlying encoder error.
        #[source]
        source: hound::Error,
    },

    /// Encoding or decoding a caller-supplied stream failed.
    #[error("WAV codec error: {0}")]
    Codec(#[from] hound::Error),

    /// Configuration rejected before rendering.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn wav(path: impl Into<PathBuf>, source: hound::Error) -> Self {
        Error::Wav {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_wav_error_names_the_path() {
        let err = Error::wav("out/sin.wav", hound::Error::Unsupported);
        let msg = err.to_string();
        assert!(msg.contains("out/sin.wav"), "got {msg}");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
