#![forbid(unsafe_code)]

//! Log record value type and well-known channel names.

use std::panic::Location;
use std::path::Path;
use std::time::SystemTime;

use tracing::Level;

/// Well-known channel names.
pub mod channel {
    /// Human-facing UI output (console or pager).
    pub const APP: &str = "runview.app";
    /// General test output.
    pub const TEST: &str = "runview.test";
    /// Platform-specific output (kernel, OS tooling).
    pub const PLATFORM: &str = "runview.platform";
}

/// One emitted log line.
///
/// `skip_newline` replaces per-record ad-hoc attributes: sinks that terminate
/// records with a newline must omit it when the flag is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub channel: String,
    pub level: Level,
    /// Source module name (file stem of the emitting source file).
    pub module: String,
    pub line: u32,
    pub message: String,
    pub skip_newline: bool,
    pub timestamp: SystemTime,
}

impl LogRecord {
    /// Create a record stamped with the current time.
    pub fn new(channel: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            level,
            module: String::new(),
            line: 0,
            message: message.into(),
            skip_newline: false,
            timestamp: SystemTime::now(),
        }
    }

    /// Set the module and line from a source location.
    #[must_use]
    pub fn at(mut self, location: &Location<'_>) -> Self {
        self.module = module_name(location.file());
        self.line = location.line();
        self
    }

    /// Set the source module and line explicitly.
    #[must_use]
    pub fn with_source(mut self, module: impl Into<String>, line: u32) -> Self {
        self.module = module.into();
        self.line = line;
        self
    }

    #[must_use]
    pub fn skip_newline(mut self, skip: bool) -> Self {
        self.skip_newline = skip;
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Derive a module name from a source path: the file stem.
///
/// `src/runner/job.rs` becomes `job`. Paths without a stem yield the input.
#[must_use]
pub fn module_name(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file)
        .to_string()
}
