#![forbid(unsafe_code)]

//! Error type shared by the runview crates.

use std::io;
use std::path::PathBuf;

use crate::context::SinkId;

/// Errors reported by output operations.
///
/// Only caller misuse and setup failures surface here. Broken pipes and
/// failed sink writes are handled where they happen and never reach callers.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Neither a `PAGER` override nor the default pager could be resolved.
    #[error("no pager available: {0}")]
    PagerUnavailable(String),

    /// `start_file_logging` was called while a file sink is already attached.
    #[error("file logging already active for run {run_id} ({})", .path.display())]
    FileLoggingActive { run_id: String, path: PathBuf },

    /// `stop_file_logging` was called without an active file sink.
    #[error("file logging is not active")]
    FileLoggingInactive,

    /// A sink id that is not (or no longer) attached to the context.
    #[error("sink {0} is not attached")]
    UnknownSink(SinkId),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_condition() {
        let err = OutputError::FileLoggingActive {
            run_id: "abc123".into(),
            path: PathBuf::from("/tmp/job.log"),
        };
        assert_eq!(
            err.to_string(),
            "file logging already active for run abc123 (/tmp/job.log)"
        );
        assert_eq!(
            OutputError::FileLoggingInactive.to_string(),
            "file logging is not active"
        );
    }

    #[test]
    fn io_errors_convert() {
        let err: OutputError = io::Error::other("disk full").into();
        assert!(matches!(err, OutputError::Io(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
