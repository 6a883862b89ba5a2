#![forbid(unsafe_code)]

//! Console sink: raw message text, newline unless the record suppresses it.
//!
//! The console is human-facing, so records carry no timestamp or level
//! prefix. A record with `skip_newline` set leaves the cursor on the same
//! line, which is how throbber glyphs and status tokens overwrite each other.

use std::fmt;
use std::io::{self, Write};

use runview_core::{LevelFilter, LogRecord, LoggingContext, RecordSink, SinkId};

/// Writes each record's message to a stream and flushes immediately.
pub struct ConsoleSink {
    writer: Box<dyn Write + Send>,
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink").finish_non_exhaustive()
    }
}

impl ConsoleSink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Box::new(writer),
        }
    }

    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl RecordSink for ConsoleSink {
    fn emit(&mut self, record: &LogRecord) -> io::Result<()> {
        self.writer.write_all(record.message.as_bytes())?;
        if !record.skip_newline {
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Attach a stderr console sink to `channel`, accepting every level.
pub fn add_console_sink(context: &LoggingContext, channel: &str) -> SinkId {
    context.attach(&[channel], LevelFilter::TRACE, ConsoleSink::stderr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::SharedWriter;
    use runview_core::{Level, channel};

    #[test]
    fn writes_message_and_newline() {
        let writer = SharedWriter::new();
        let mut sink = ConsoleSink::new(writer.clone());
        sink.emit(&LogRecord::new(channel::APP, Level::INFO, "hello"))
            .unwrap();
        assert_eq!(writer.snapshot(), "hello\n");
    }

    #[test]
    fn skip_newline_keeps_cursor_on_line() {
        let writer = SharedWriter::new();
        let mut sink = ConsoleSink::new(writer.clone());
        sink.emit(&LogRecord::new(channel::APP, Level::INFO, "test 1: ").skip_newline(true))
            .unwrap();
        sink.emit(&LogRecord::new(channel::APP, Level::INFO, "-").skip_newline(true))
            .unwrap();
        sink.emit(&LogRecord::new(channel::APP, Level::INFO, "PASS"))
            .unwrap();
        assert_eq!(writer.snapshot(), "test 1: -PASS\n");
    }

    #[test]
    fn no_level_or_timestamp_prefix() {
        let writer = SharedWriter::new();
        let context = LoggingContext::new();
        context.attach(&[channel::APP], LevelFilter::TRACE, ConsoleSink::new(writer.clone()));
        context.logger(channel::APP).error("plain");
        assert_eq!(writer.snapshot(), "plain\n");
    }

    #[test]
    fn add_console_sink_wires_channel() {
        let context = LoggingContext::new();
        let id = add_console_sink(&context, channel::APP);
        assert_eq!(context.channels_of(id), Some(vec![channel::APP.to_string()]));
    }
}
