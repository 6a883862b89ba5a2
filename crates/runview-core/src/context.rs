#![forbid(unsafe_code)]

//! Explicit logging context: named channels fanned out to attached sinks.
//!
//! A [`LoggingContext`] owns the wiring between channels and sinks. Nothing is
//! registered globally; whoever holds the context decides what is attached
//! where. Clones share the same registry.
//!
//! # Fan-out
//!
//! A sink is attached to one or more channels with a level threshold. A record
//! on channel `c` at level `l` reaches every sink attached to `c` whose
//! threshold admits `l`, in attach order.
//!
//! # Failure Modes
//!
//! | Mode | Behavior |
//! |------|----------|
//! | Sink write fails | Reported on stderr, record dropped for that sink |
//! | Record emitted from inside a sink into the same context | Dropped (no re-entrant dispatch) |
//! | Record forwarded from a sink into another context | Delivered by that context |
//! | Poisoned registry lock | Recovered; dispatch continues |
//!
//! ```
//! use runview_core::capture::CaptureSink;
//! use runview_core::context::LoggingContext;
//! use tracing::Level;
//! use tracing::level_filters::LevelFilter;
//!
//! let context = LoggingContext::new();
//! let capture = CaptureSink::new();
//! context.attach(&["runview.test"], LevelFilter::INFO, capture.clone());
//!
//! let logger = context.logger("runview.test");
//! logger.log(Level::INFO, "kept");
//! logger.log(Level::DEBUG, "filtered");
//! assert_eq!(capture.messages(), vec!["kept".to_string()]);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::panic::Location;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::Level;
use tracing::level_filters::LevelFilter;

use crate::error::{OutputError, OutputResult};
use crate::record::LogRecord;

/// A destination that accepts whole log records.
pub trait RecordSink: Send {
    /// Write one record.
    fn emit(&mut self, record: &LogRecord) -> io::Result<()>;

    /// Push buffered output to the underlying destination.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Release the destination. Later `emit` calls must not reach it.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// Handle for an attached sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SinkId(u64);

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Attached {
    id: SinkId,
    channels: Vec<String>,
    threshold: LevelFilter,
    sink: Box<dyn RecordSink>,
}

impl Attached {
    fn wants(&self, record: &LogRecord) -> bool {
        record.level <= self.threshold && self.channels.iter().any(|c| *c == record.channel)
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    sinks: Vec<Attached>,
}

thread_local! {
    /// Registries this thread is currently dispatching through, innermost last.
    static DISPATCHING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

fn is_dispatching(key: usize) -> bool {
    DISPATCHING.with(|active| active.borrow().contains(&key))
}

struct DispatchGuard;

impl DispatchGuard {
    fn enter(key: usize) -> Option<Self> {
        DISPATCHING.with(|active| {
            let mut active = active.borrow_mut();
            if active.contains(&key) {
                None
            } else {
                active.push(key);
                Some(Self)
            }
        })
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|active| {
            active.borrow_mut().pop();
        });
    }
}

/// Shared channel-to-sink registry.
#[derive(Clone, Default)]
pub struct LoggingContext {
    registry: Arc<Mutex<Registry>>,
}

impl fmt::Debug for LoggingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("LoggingContext");
        match self.registry.try_lock() {
            Ok(registry) => out.field("sinks", &registry.sinks.len()),
            Err(_) => out.field("sinks", &"<locked>"),
        };
        out.finish()
    }
}

impl LoggingContext {
    /// Create an empty context with no sinks attached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(&self) -> usize {
        Arc::as_ptr(&self.registry) as usize
    }

    /// Whether this thread is inside [`dispatch`](Self::dispatch) for this
    /// context, i.e. running a sink's `emit`.
    #[must_use]
    pub fn is_dispatching(&self) -> bool {
        is_dispatching(self.key())
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        match self.registry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Attach `sink` to every channel in `channels`.
    pub fn attach<S>(&self, channels: &[&str], threshold: LevelFilter, sink: S) -> SinkId
    where
        S: RecordSink + 'static,
    {
        self.attach_boxed(channels, threshold, Box::new(sink))
    }

    /// Attach an already boxed sink.
    pub fn attach_boxed(
        &self,
        channels: &[&str],
        threshold: LevelFilter,
        sink: Box<dyn RecordSink>,
    ) -> SinkId {
        let mut registry = self.lock();
        let id = SinkId(registry.next_id);
        registry.next_id += 1;
        registry.sinks.push(Attached {
            id,
            channels: channels.iter().map(|c| (*c).to_string()).collect(),
            threshold,
            sink,
        });
        id
    }

    /// Detach a sink from all of its channels and hand it back.
    ///
    /// The sink is not closed; the caller owns it again.
    pub fn detach(&self, id: SinkId) -> OutputResult<Box<dyn RecordSink>> {
        let mut registry = self.lock();
        let index = registry
            .sinks
            .iter()
            .position(|attached| attached.id == id)
            .ok_or(OutputError::UnknownSink(id))?;
        Ok(registry.sinks.remove(index).sink)
    }

    #[must_use]
    pub fn is_attached(&self, id: SinkId) -> bool {
        self.lock().sinks.iter().any(|attached| attached.id == id)
    }

    /// Channels a sink is attached to, or `None` if it is not attached.
    #[must_use]
    pub fn channels_of(&self, id: SinkId) -> Option<Vec<String>> {
        self.lock()
            .sinks
            .iter()
            .find(|attached| attached.id == id)
            .map(|attached| attached.channels.clone())
    }

    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.lock().sinks.len()
    }

    /// Whether any attached sink would accept a record on `channel` at `level`.
    ///
    /// Always `false` while this thread is dispatching through this context,
    /// since such a record would be dropped anyway.
    #[must_use]
    pub fn enabled(&self, channel: &str, level: Level) -> bool {
        if self.is_dispatching() {
            return false;
        }
        self.lock().sinks.iter().any(|attached| {
            level <= attached.threshold && attached.channels.iter().any(|c| c == channel)
        })
    }

    /// Deliver a record to every interested sink.
    ///
    /// Sink failures are reported on stderr and never returned.
    pub fn dispatch(&self, record: &LogRecord) {
        let Some(_guard) = DispatchGuard::enter(self.key()) else {
            return;
        };
        let mut registry = self.lock();
        for attached in registry.sinks.iter_mut().filter(|a| a.wants(record)) {
            if let Err(err) = attached.sink.emit(record) {
                report_emit_error(attached.id, record, &err);
            }
        }
    }

    /// Flush every attached sink.
    pub fn flush(&self) {
        let mut registry = self.lock();
        for attached in &mut registry.sinks {
            if let Err(err) = attached.sink.flush() {
                report_flush_error(attached.id, &err);
            }
        }
    }

    /// A logger handle bound to one channel of this context.
    pub fn logger(&self, channel: impl Into<String>) -> Logger {
        Logger {
            context: self.clone(),
            channel: Arc::from(channel.into()),
        }
    }
}

fn report_emit_error(id: SinkId, record: &LogRecord, err: &io::Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "--- Logging error ---");
    let _ = writeln!(stderr, "sink {id} failed: {err}");
    let _ = writeln!(
        stderr,
        "record: channel={} level={} {}:{} message={:?}",
        record.channel, record.level, record.module, record.line, record.message
    );
}

fn report_flush_error(id: SinkId, err: &io::Error) {
    let _ = writeln!(io::stderr().lock(), "--- Logging error ---\nsink {id} flush failed: {err}");
}

/// Emits records on a single channel of a [`LoggingContext`].
///
/// Records carry the caller's file stem and line number.
#[derive(Clone)]
pub struct Logger {
    context: LoggingContext,
    channel: Arc<str>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

impl Logger {
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    #[must_use]
    pub fn context(&self) -> &LoggingContext {
        &self.context
    }

    #[must_use]
    pub fn is_enabled(&self, level: Level) -> bool {
        self.context.enabled(&self.channel, level)
    }

    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>) {
        self.log_with(level, message, false);
    }

    /// Emit a record, optionally asking line-terminated sinks to omit the newline.
    #[track_caller]
    pub fn log_with(&self, level: Level, message: impl Into<String>, skip_newline: bool) {
        self.log_at(level, message, skip_newline, Location::caller());
    }

    /// Emit a record attributed to an explicit source location.
    pub fn log_at(
        &self,
        level: Level,
        message: impl Into<String>,
        skip_newline: bool,
        location: &Location<'_>,
    ) {
        let record = LogRecord::new(&*self.channel, level, message)
            .at(location)
            .skip_newline(skip_newline);
        self.context.dispatch(&record);
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::DEBUG, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::INFO, message);
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::WARN, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::ERROR, message);
    }
}
