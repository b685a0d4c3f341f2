//! Tone specifications and the reader that pulls them from a text stream.
//!
//! Input is a sequence of whitespace-separated `<frequency> <offset> <duration>` records.
//! Records are not line bound: a record may span lines and a line may hold several records.
//! The first token that fails to parse, or end of stream mid-record, ends the sequence.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead};
use std::ops::Range;

use log::debug;

use crate::error::Result;

/// One tone to add into the buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneSpec {
    /// Frequency in Hz.
    pub frequency: f64,
    /// First sample index. May be negative or past the end of the buffer.
    pub offset: i64,
    /// Length in samples. Non-positive lengths render nothing.
    pub duration: i64,
}

impl ToneSpec {
    pub fn new(frequency: f64, offset: i64, duration: i64) -> Self {
        Self {
            frequency,
            offset,
            duration,
        }
    }

    /// The part of `[offset, offset + duration)` that lies inside `[0, len)`.
    /// Always a valid (possibly empty) range of buffer indices.
    pub fn window(&self, len: usize) -> Range<usize> {
        let len_i = i64::try_from(len).unwrap_or(i64::MAX);
        let start = self.offset.clamp(0, len_i);
        let end = self.offset.saturating_add(self.duration).clamp(start, len_i);
        let window = start as usize..end as usize;
        if window.len() as i64 != self.duration.max(0) {
            debug!(
                "tone {} Hz [{}, +{}) clamped to {:?}",
                self.frequency, self.offset, self.duration, window
            );
        }
        window
    }
}

/// Status line echoed for each accepted record.
impl fmt::Display for ToneSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6} Hz\t{} offset\t{} duration",
            self.frequency, self.offset, self.duration
        )
    }
}

/// Iterator of [`ToneSpec`]s read from a text stream. Yields `Err` only for real I/O
/// failures; malformed input just ends the iteration.
pub struct ToneReader<R> {
    reader: R,
    tokens: VecDeque<Vec<u8>>,
    done: bool,
}

impl<R: BufRead> ToneReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            tokens: VecDeque::new(),
            done: false,
        }
    }

    /// Next whitespace-separated token, reading more lines as needed.
    fn next_token(&mut self) -> io::Result<Option<Vec<u8>>> {
        loop {
            if let Some(token) = self.tokens.pop_front() {
                return Ok(Some(token));
            }
            let mut line = Vec::new();
            match self.reader.read_until(b'\n', &mut line) {
                Ok(0) => return Ok(None),
                Ok(_) => self.tokens.extend(
                    line.split(u8::is_ascii_whitespace)
                        .filter(|t| !t.is_empty())
                        .map(<[u8]>::to_vec),
                ),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// A token that is not UTF-8 fails to parse like any other malformed token.
    fn next_field<T: std::str::FromStr>(&mut self) -> io::Result<Option<T>> {
        Ok(self
            .next_token()?
            .and_then(|t| std::str::from_utf8(&t).ok()?.parse().ok()))
    }

    fn read_record(&mut self) -> io::Result<Option<ToneSpec>> {
        let Some(frequency) = self.next_field::<f64>()? else {
            return Ok(None);
        };
        let Some(offset) = self.next_field::<i64>()? else {
            return Ok(None);
        };
        let Some(duration) = self.next_field::<i64>()? else {
            return Ok(None);
        };
        Ok(Some(ToneSpec::new(frequency, offset, duration)))
    }
}

impl<R: BufRead> Iterator for ToneReader<R> {
    type Item = Result<ToneSpec>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(tone)) => Some(Ok(tone)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}
