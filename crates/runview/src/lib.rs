#![forbid(unsafe_code)]

//! runview public facade crate.
//!
//! Re-exports the core and runtime types and offers one-call setup for the
//! two ways a test runner presents its output: an interactive console view
//! or a paged listing.

use std::fmt;

use tracing_subscriber::prelude::*;

// --- Core re-exports -------------------------------------------------------

pub use runview_core::{
    CaptureSink, Category, ContextLayer, Level, LevelFilter, LineBufferedLogSink, LogRecord,
    Logger, LoggingContext, OutputError, OutputResult, RecordSink, SinkId, Status, TermSupport,
    channel,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use runview_runtime::{
    ConsoleSink, FileSink, OutputView, Pager, PagerConfig, PagerOutput, THROBBER_STEPS,
    ViewConfig, add_console_sink,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for runview setup and file logging.
#[derive(Debug)]
pub enum Error {
    /// I/O failure.
    Io(std::io::Error),
    /// Output layer failure (pager, file logging, sinks).
    Output(OutputError),
    /// A global `tracing` subscriber was already installed.
    Subscriber(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "{err}"),
            Self::Subscriber(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Output(err) => Some(err),
            Self::Subscriber(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<OutputError> for Error {
    fn from(err: OutputError) -> Self {
        Self::Output(err)
    }
}

/// Standard result type for runview APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Setup ----------------------------------------------------------------

/// Route every `tracing` event in the process through `context`.
///
/// The event target selects the channel, so
/// `tracing::info!(target: "runview.test", ...)` reaches the run's log file.
pub fn install_tracing(context: &LoggingContext) -> Result<()> {
    let subscriber = tracing_subscriber::registry().with(ContextLayer::new(context.clone()));
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| Error::Subscriber(err.to_string()))
}

/// Interactive view with a stderr console sink on the UI channel.
#[cfg(feature = "runtime")]
pub fn interactive_view(context: &LoggingContext) -> OutputView {
    let config = ViewConfig::default();
    add_console_sink(context, &config.console_channel);
    OutputView::new(context.clone(), config)
}

/// List-mode view writing to a pager, or stdout when none is available.
#[cfg(feature = "runtime")]
pub fn list_view(context: &LoggingContext) -> OutputView {
    OutputView::new(context.clone(), ViewConfig::default().list_mode(true))
}

/// View configured from the environment; interactive views get a console sink.
#[cfg(feature = "runtime")]
pub fn view_from_env(context: &LoggingContext) -> OutputView {
    let config = ViewConfig::from_env();
    if !config.list_mode {
        add_console_sink(context, &config.console_channel);
    }
    OutputView::new(context.clone(), config)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, Level, LevelFilter, LineBufferedLogSink, Logger, LoggingContext, Result, Status,
        TermSupport, channel,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{OutputView, ViewConfig};

    pub use crate::core;
    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use runview_core as core;
#[cfg(feature = "runtime")]
pub use runview_runtime as runtime;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_errors_convert() {
        let err: Error = OutputError::FileLoggingInactive.into();
        assert!(matches!(err, Error::Output(OutputError::FileLoggingInactive)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn io_errors_convert() {
        let err: Error = std::io::Error::other("disk gone").into();
        assert_eq!(err.to_string(), "disk gone");
    }

    #[cfg(feature = "runtime")]
    #[test]
    fn interactive_view_attaches_console_sink() {
        let context = LoggingContext::new();
        let view = interactive_view(&context);
        assert!(!view.is_list_mode());
        assert_eq!(context.sink_count(), 1);
    }

    #[cfg(feature = "runtime")]
    #[test]
    fn file_logging_errors_flow_through_result() {
        fn run(view: &mut OutputView, path: &std::path::Path) -> Result<()> {
            view.start_file_logging(path, LevelFilter::DEBUG, "run")?;
            view.stop_file_logging()?;
            view.stop_file_logging()?;
            Ok(())
        }

        let dir = tempfile::tempdir().unwrap();
        let context = LoggingContext::new();
        let mut view = OutputView::with_output(
            context,
            ViewConfig::default(),
            TermSupport::disabled(),
            PagerOutput::stdout(),
        );
        let err = run(&mut view, &dir.path().join("run.log")).unwrap_err();
        assert!(matches!(err, Error::Output(OutputError::FileLoggingInactive)));
    }
}
