#![forbid(unsafe_code)]

//! The output view: console or pager routing, status lines, throbber, and
//! the per-run log file.
//!
//! # Modes
//!
//! The mode is fixed at construction:
//! - **interactive**: UI text goes to the console channel's logger, with the
//!   newline suppressed on request so a throbber glyph can be overwritten by
//!   the next glyph or by the final status token.
//! - **list**: UI text is written straight to a pager (or stdout when none is
//!   available), one newline per message unless suppressed.
//!
//! File logging is independent of the mode. While active, one file sink is
//! attached to both the test and platform channels.
//!
//! ```
//! use runview_core::{CaptureSink, LevelFilter, LoggingContext, TermSupport};
//! use runview_runtime::{OutputView, PagerOutput, ViewConfig};
//!
//! let context = LoggingContext::new();
//! let console = CaptureSink::new();
//! context.attach(&["runview.app"], LevelFilter::TRACE, console.clone());
//!
//! let mut view = OutputView::with_output(
//!     context,
//!     ViewConfig::default(),
//!     TermSupport::disabled(),
//!     PagerOutput::stdout(),
//! );
//! view.log_ui_status_pass(1.5);
//! assert_eq!(console.messages(), vec!["PASS (1.50 s)"]);
//! ```

use std::fmt::Write as _;
use std::panic::Location;
use std::path::{Path, PathBuf};

use runview_core::{
    Level, LevelFilter, Logger, LoggingContext, OutputError, OutputResult, SinkId, Status,
    TermSupport,
};

use crate::config::ViewConfig;
use crate::file_sink::FileSink;
use crate::pager::PagerOutput;

/// Spinner glyphs, in display order.
pub const THROBBER_STEPS: [&str; 4] = ["-", "\\", "|", "/"];

#[derive(Debug)]
struct FileLogging {
    sink: SinkId,
    run_id: String,
    path: PathBuf,
}

/// Routes UI output and owns the run's log file.
#[derive(Debug)]
pub struct OutputView {
    config: ViewConfig,
    context: LoggingContext,
    console: Logger,
    term: TermSupport,
    output: PagerOutput,
    throbber_pos: usize,
    file_logging: Option<FileLogging>,
}

impl OutputView {
    /// Detect terminal support and, in list mode, spawn a pager.
    pub fn new(context: LoggingContext, config: ViewConfig) -> Self {
        let output = if config.list_mode {
            PagerOutput::get_or_fallback()
        } else {
            PagerOutput::stdout()
        };
        Self::with_output(context, config, TermSupport::detect(), output)
    }

    /// Build a view over explicit terminal support and list-mode output.
    pub fn with_output(
        context: LoggingContext,
        config: ViewConfig,
        term: TermSupport,
        output: PagerOutput,
    ) -> Self {
        let console = context.logger(config.console_channel.as_str());
        Self {
            config,
            context,
            console,
            term,
            output,
            throbber_pos: 0,
            file_logging: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    #[must_use]
    pub fn context(&self) -> &LoggingContext {
        &self.context
    }

    #[must_use]
    pub fn term_support(&self) -> &TermSupport {
        &self.term
    }

    /// Drop all color and cursor movement from later output.
    pub fn disable_colors(&mut self) {
        self.term.disable();
    }

    #[must_use]
    pub fn is_list_mode(&self) -> bool {
        self.config.list_mode
    }

    /// Index of the next throbber glyph, in `0..THROBBER_STEPS.len()`.
    #[must_use]
    pub fn throbber_position(&self) -> usize {
        self.throbber_pos
    }

    /// Route one message by mode.
    #[track_caller]
    pub fn log(&mut self, msg: &str, level: Level, skip_newline: bool) {
        self.log_from(msg, level, skip_newline, Location::caller());
    }

    fn log_from(&mut self, msg: &str, level: Level, skip_newline: bool, at: &Location<'_>) {
        if self.config.list_mode {
            if skip_newline {
                self.output.write(msg);
            } else {
                let mut line = String::with_capacity(msg.len() + 1);
                line.push_str(msg);
                line.push('\n');
                self.output.write(&line);
            }
        } else {
            self.console.log_at(level, msg, skip_newline, at);
        }
    }

    /// Green text at INFO.
    #[track_caller]
    pub fn log_ui_healthy(&mut self, msg: &str, skip_newline: bool) {
        let text = self.term.healthy_str(msg);
        self.log_from(&text, Level::INFO, skip_newline, Location::caller());
    }

    /// Yellow text at INFO.
    #[track_caller]
    pub fn log_ui_partial(&mut self, msg: &str, skip_newline: bool) {
        let text = self.term.partial_str(msg);
        self.log_from(&text, Level::INFO, skip_newline, Location::caller());
    }

    /// Blue header line at INFO.
    #[track_caller]
    pub fn log_ui_header(&mut self, msg: &str) {
        let text = self.term.header_str(msg);
        self.log_from(&text, Level::INFO, false, Location::caller());
    }

    /// Red header line. Logged at INFO so it shows at the default threshold.
    #[track_caller]
    pub fn log_ui_error(&mut self, msg: &str) {
        let text = self.term.fail_header_str(msg);
        self.log_from(&text, Level::INFO, false, Location::caller());
    }

    /// Status token, plus ` (N.NN s)` unless the status is a skip.
    #[must_use]
    pub fn format_status(&self, status: Status, elapsed: f64) -> String {
        let mut text = self.term.status_str(status);
        if status != Status::Skip {
            let _ = write!(text, " ({elapsed:.2} s)");
        }
        text
    }

    /// Log a final status line. Pass and skip go out at INFO, the rest at ERROR.
    #[track_caller]
    pub fn log_ui_status(&mut self, status: Status, elapsed: f64) {
        let level = match status {
            Status::Pass | Status::Skip => Level::INFO,
            Status::Fail | Status::Error | Status::Warn | Status::NotFound => Level::ERROR,
        };
        let text = self.format_status(status, elapsed);
        self.log_from(&text, level, false, Location::caller());
    }

    #[track_caller]
    pub fn log_ui_status_pass(&mut self, elapsed: f64) {
        self.log_ui_status(Status::Pass, elapsed);
    }

    #[track_caller]
    pub fn log_ui_status_fail(&mut self, elapsed: f64) {
        self.log_ui_status(Status::Fail, elapsed);
    }

    #[track_caller]
    pub fn log_ui_status_error(&mut self, elapsed: f64) {
        self.log_ui_status(Status::Error, elapsed);
    }

    /// Skips carry no elapsed time; `elapsed` is ignored.
    #[track_caller]
    pub fn log_ui_status_skip(&mut self, elapsed: f64) {
        self.log_ui_status(Status::Skip, elapsed);
    }

    #[track_caller]
    pub fn log_ui_status_warn(&mut self, elapsed: f64) {
        self.log_ui_status(Status::Warn, elapsed);
    }

    #[track_caller]
    pub fn log_ui_status_not_found(&mut self, elapsed: f64) {
        self.log_ui_status(Status::NotFound, elapsed);
    }

    /// Draw the next spinner glyph over the previous one.
    ///
    /// Green when the test itself reported progress, yellow for runner
    /// liveness only. The phase advances either way.
    #[track_caller]
    pub fn log_ui_throbber_progress(&mut self, progress_from_test: bool) {
        let mut glyph = String::from(self.term.move_back());
        glyph.push_str(THROBBER_STEPS[self.throbber_pos]);
        let text = if progress_from_test {
            self.term.healthy_str(&glyph)
        } else {
            self.term.partial_str(&glyph)
        };
        self.log_from(&text, Level::INFO, true, Location::caller());
        self.throbber_pos = (self.throbber_pos + 1) % THROBBER_STEPS.len();
    }

    /// Attach a log file to the test and platform channels.
    pub fn start_file_logging(
        &mut self,
        path: impl AsRef<Path>,
        level: LevelFilter,
        run_id: impl Into<String>,
    ) -> OutputResult<()> {
        if let Some(active) = &self.file_logging {
            return Err(OutputError::FileLoggingActive {
                run_id: active.run_id.clone(),
                path: active.path.clone(),
            });
        }
        let path = path.as_ref().to_path_buf();
        let sink = FileSink::create(&path)?;
        let id = self.context.attach(
            &[
                self.config.test_channel.as_str(),
                self.config.platform_channel.as_str(),
            ],
            level,
            sink,
        );
        self.file_logging = Some(FileLogging {
            sink: id,
            run_id: run_id.into(),
            path,
        });
        Ok(())
    }

    /// Detach the log file from both channels and close it.
    pub fn stop_file_logging(&mut self) -> OutputResult<()> {
        let active = self
            .file_logging
            .take()
            .ok_or(OutputError::FileLoggingInactive)?;
        let mut sink = self.context.detach(active.sink)?;
        sink.close()?;
        Ok(())
    }

    /// Close the pager, waiting for it to exit. Later list-mode output is dropped.
    pub fn close(&mut self) {
        self.output.close();
    }

    #[must_use]
    pub fn is_file_logging(&self) -> bool {
        self.file_logging.is_some()
    }

    #[must_use]
    pub fn file_log_path(&self) -> Option<&Path> {
        self.file_logging.as_ref().map(|active| active.path.as_path())
    }

    #[must_use]
    pub fn run_id(&self) -> Option<&str> {
        self.file_logging.as_ref().map(|active| active.run_id.as_str())
    }
}

impl Drop for OutputView {
    fn drop(&mut self) {
        if self.file_logging.is_some() {
            let _ = self.stop_file_logging();
        }
    }
}
