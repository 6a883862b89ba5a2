#![forbid(unsafe_code)]

//! `tracing` integration: routes events into a [`LoggingContext`].
//!
//! The event target is the channel, so code can log to the test channel with
//! plain `tracing` macros and every sink attached to that channel receives it:
//!
//! ```
//! use runview_core::bridge::ContextLayer;
//! use runview_core::capture::CaptureSink;
//! use runview_core::context::LoggingContext;
//! use tracing::level_filters::LevelFilter;
//! use tracing_subscriber::prelude::*;
//!
//! let context = LoggingContext::new();
//! let capture = CaptureSink::new();
//! context.attach(&["runview.test"], LevelFilter::DEBUG, capture.clone());
//!
//! let subscriber = tracing_subscriber::registry().with(ContextLayer::new(context));
//! tracing::subscriber::with_default(subscriber, || {
//!     tracing::info!(target: "runview.test", "booting guest");
//! });
//! assert_eq!(capture.messages(), vec!["booting guest"]);
//! ```
//!
//! A boolean `skip_newline` field sets [`LogRecord::skip_newline`]; other
//! fields are appended to the message as `key=value`.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::context::LoggingContext;
use crate::record::{LogRecord, module_name};

/// Field name carrying the newline-suppression flag.
pub const SKIP_NEWLINE_FIELD: &str = "skip_newline";

/// Extracts message, newline flag and extra fields from an event.
#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
    skip_newline: bool,
}

impl EventVisitor {
    fn render(&mut self) -> String {
        let mut out = self.message.take().unwrap_or_default();
        for (key, value) in &self.fields {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "{key}={value}");
        }
        out
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        // `message` is `fmt::Arguments`, whose Debug output is the text itself.
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            let rendered = strip_debug_quotes(&format!("{value:?}"));
            self.fields.push((field.name().to_string(), rendered));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == SKIP_NEWLINE_FIELD {
            self.skip_newline = value;
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.push((field.name().to_string(), value.to_string()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.push((field.name().to_string(), value.to_string()));
    }
}

fn strip_debug_quotes(s: &str) -> String {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

/// A `tracing_subscriber::Layer` that dispatches events through a context.
#[derive(Debug, Clone)]
pub struct ContextLayer {
    context: LoggingContext,
}

impl ContextLayer {
    pub fn new(context: LoggingContext) -> Self {
        Self { context }
    }

    #[must_use]
    pub fn context(&self) -> &LoggingContext {
        &self.context
    }
}

impl<S> Layer<S> for ContextLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = *metadata.level();
        // Events raised by a sink of this context would block on its registry.
        if self.context.is_dispatching() || !self.context.enabled(metadata.target(), level) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let module = match (metadata.file(), metadata.module_path()) {
            (Some(file), _) => module_name(file),
            (None, Some(path)) => path.rsplit("::").next().unwrap_or(path).to_string(),
            (None, None) => String::new(),
        };
        let record = LogRecord::new(metadata.target(), level, visitor.render())
            .with_source(module, metadata.line().unwrap_or(0))
            .skip_newline(visitor.skip_newline);
        self.context.dispatch(&record);
    }
}
