#![forbid(unsafe_code)]

//! Line-buffered adapter from arbitrary text writes to whole-line records.
//!
//! Subprocess output and `write!` calls arrive in fragments that rarely line up
//! with newlines. [`LineBufferedLogSink`] carries incomplete fragments forward
//! and forwards one record per completed line, in the order the terminators
//! were seen.
//!
//! # Invariants
//!
//! 1. The buffer only holds text written since the last `\n`.
//! 2. Forwarding the buffer emits exactly one record (`prefix + joined
//!    fragments`) and empties it.
//! 3. For fragments `f1..fn` followed by [`flush`](LineBufferedLogSink::flush),
//!    the forwarded lines equal `(f1 + .. + fn).split('\n')` minus a final
//!    empty piece.
//!
//! ```
//! use runview_core::capture::CaptureSink;
//! use runview_core::context::LoggingContext;
//! use runview_core::line_buffer::LineBufferedLogSink;
//! use tracing::level_filters::LevelFilter;
//!
//! let context = LoggingContext::new();
//! let capture = CaptureSink::new();
//! context.attach(&["runview.test"], LevelFilter::TRACE, capture.clone());
//!
//! let mut sink = LineBufferedLogSink::new(context.logger("runview.test"));
//! sink.write("a");
//! sink.write("b\nc");
//! assert_eq!(capture.messages(), vec!["ab"]);
//! sink.flush();
//! assert_eq!(capture.messages(), vec!["ab", "c"]);
//! ```

use std::fmt;
use std::io;
use std::mem;
use std::panic::Location;

use tracing::Level;

use crate::context::Logger;

/// Buffers partial writes and forwards complete lines to a [`Logger`].
pub struct LineBufferedLogSink {
    prefix: String,
    level: Level,
    buffer: Vec<String>,
    logger: Logger,
    // Bytes of an incomplete UTF-8 sequence from `io::Write`.
    pending: Vec<u8>,
}

impl fmt::Debug for LineBufferedLogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineBufferedLogSink")
            .field("prefix", &self.prefix)
            .field("level", &self.level)
            .field("buffer", &self.buffer)
            .field("channel", &self.logger.channel())
            .finish()
    }
}

impl LineBufferedLogSink {
    /// New sink with an empty prefix at `DEBUG` level.
    pub fn new(logger: Logger) -> Self {
        Self {
            prefix: String::new(),
            level: Level::DEBUG,
            buffer: Vec::new(),
            logger,
            pending: Vec::new(),
        }
    }

    /// Prepend `prefix` to every forwarded line.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Forward lines at `level`.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Text carried forward, waiting for a line terminator.
    #[must_use]
    pub fn buffered(&self) -> String {
        self.buffer.concat()
    }

    /// Always `false`; this sink is never an interactive device.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        false
    }

    /// Write a text fragment, forwarding every line it completes.
    ///
    /// Forwarded records carry the location of this call.
    #[track_caller]
    pub fn write(&mut self, data: &str) {
        self.push_text(data, Location::caller());
    }

    /// Write each fragment in turn.
    ///
    /// Not the same as writing the joined fragments once: each one goes
    /// through the splitting rule independently.
    #[track_caller]
    pub fn writelines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let at = Location::caller();
        for data in lines {
            self.push_text(data.as_ref(), at);
        }
    }

    /// Forward whatever is buffered as one line, terminated or not.
    #[track_caller]
    pub fn flush(&mut self) {
        self.flush_from(Location::caller());
    }

    fn flush_from(&mut self, at: &Location<'_>) {
        if !self.pending.is_empty() {
            let tail = String::from_utf8_lossy(&mem::take(&mut self.pending)).into_owned();
            self.push_text(&tail, at);
        }
        self.flush_buffer(at);
    }

    fn push_text(&mut self, data: &str, at: &Location<'_>) {
        let pieces: Vec<&str> = data.split('\n').collect();
        if let [first, interior @ .., last] = pieces.as_slice() {
            self.buffer.push((*first).to_string());
            self.flush_buffer(at);
            for line in interior {
                self.log_line(line, at);
            }
            if !last.is_empty() {
                self.buffer.push((*last).to_string());
            }
        } else if !data.is_empty() {
            self.buffer.push(data.to_string());
        }
    }

    fn flush_buffer(&mut self, at: &Location<'_>) {
        if self.buffer.is_empty() {
            return;
        }
        let line = mem::take(&mut self.buffer).concat();
        self.log_line(&line, at);
    }

    fn log_line(&self, line: &str, at: &Location<'_>) {
        let mut message = String::with_capacity(self.prefix.len() + line.len());
        message.push_str(&self.prefix);
        message.push_str(line);
        self.logger
            .log_at(self.level, message, false, at);
    }
}

// Lines forwarded from drop are attributed to this module.
impl Drop for LineBufferedLogSink {
    fn drop(&mut self) {
        self.flush_from(Location::caller());
    }
}

impl fmt::Write for LineBufferedLogSink {
    #[track_caller]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_text(s, Location::caller());
        Ok(())
    }
}

impl io::Write for LineBufferedLogSink {
    #[track_caller]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        let text = take_decoded(&mut self.pending);
        if !text.is_empty() {
            self.push_text(&text, Location::caller());
        }
        Ok(buf.len())
    }

    #[track_caller]
    fn flush(&mut self) -> io::Result<()> {
        self.flush_from(Location::caller());
        Ok(())
    }
}

/// Decode the longest complete UTF-8 prefix of `pending`, leaving an
/// incomplete trailing sequence in place. Invalid bytes become U+FFFD.
fn take_decoded(pending: &mut Vec<u8>) -> String {
    let mut out = String::with_capacity(pending.len());
    let mut rest = pending.as_slice();
    loop {
        match std::str::from_utf8(rest) {
            Ok(text) => {
                out.push_str(text);
                rest = &[];
                break;
            }
            Err(err) => {
                let valid = err.valid_up_to();
                out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                match err.error_len() {
                    Some(invalid) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        rest = &rest[valid + invalid..];
                    }
                    None => {
                        rest = &rest[valid..];
                        break;
                    }
                }
            }
        }
    }
    let consumed = pending.len() - rest.len();
    pending.drain(..consumed);
    out
}
