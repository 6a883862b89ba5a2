#![forbid(unsafe_code)]

//! Core: terminal color gating, log records, the logging context, and
//! line-buffered sinks.

pub mod bridge;
pub mod capture;
pub mod context;
pub mod error;
pub mod line_buffer;
pub mod record;
pub mod term_support;

pub use bridge::ContextLayer;
pub use capture::CaptureSink;
pub use context::{Logger, LoggingContext, RecordSink, SinkId};
pub use error::{OutputError, OutputResult};
pub use line_buffer::LineBufferedLogSink;
pub use record::{LogRecord, channel};
pub use term_support::{Category, Status, TermSupport};

// Severity types used across the public API.
pub use tracing::Level;
pub use tracing::level_filters::LevelFilter;
