#![forbid(unsafe_code)]

//! Per-run log file sink.
//!
//! Each record becomes one line:
//!
//! ```text
//! 14:03:07 harness    L0042 INFO | booting guest
//! ```
//!
//! Local wall-clock time, the source module padded and truncated to ten
//! columns, a four-digit zero-padded line number, the level name padded and
//! truncated to five columns, then the message.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use runview_core::{Level, LogRecord, RecordSink};
use time::{OffsetDateTime, UtcOffset};

/// Width of the module column.
pub const MODULE_WIDTH: usize = 10;
/// Width of the level column.
pub const LEVEL_WIDTH: usize = 5;

/// Conventional level name, before truncation to [`LEVEL_WIDTH`].
#[must_use]
pub const fn level_name(level: Level) -> &'static str {
    match level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        Level::ERROR => "ERROR",
    }
}

/// `HH:MM:SS` of `timestamp` at `offset`.
#[must_use]
pub fn format_timestamp(timestamp: SystemTime, offset: UtcOffset) -> String {
    let at = OffsetDateTime::from(timestamp).to_offset(offset);
    format!("{:02}:{:02}:{:02}", at.hour(), at.minute(), at.second())
}

/// Render one record as a log file line, including the trailing newline.
#[must_use]
pub fn format_record(record: &LogRecord, offset: UtcOffset) -> String {
    format!(
        "{} {:<mw$.mw$} L{:04} {:<lw$.lw$}| {}\n",
        format_timestamp(record.timestamp, offset),
        record.module,
        record.line,
        level_name(record.level),
        record.message,
        mw = MODULE_WIDTH,
        lw = LEVEL_WIDTH,
    )
}

/// Appends formatted records to a file, one write per record.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Option<File>,
    offset: UtcOffset,
}

impl FileSink {
    /// Open `path` for appending, creating it if needed.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        // Resolved once; the local offset cannot be queried safely once
        // other threads are running on some platforms.
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        Ok(Self {
            path,
            file: Some(file),
            offset,
        })
    }

    /// Use a fixed UTC offset for timestamps.
    #[must_use]
    pub fn with_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }
}

impl RecordSink for FileSink {
    fn emit(&mut self, record: &LogRecord) -> io::Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        file.write_all(format_record(record, self.offset).as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }
}
