#![forbid(unsafe_code)]

//! Runtime: console and file sinks, the external pager, and the output view.

pub mod config;
pub mod console;
pub mod file_sink;
pub mod pager;
pub mod view;

#[cfg(test)]
mod test_util;

pub use config::{LIST_MODE_ENV, ViewConfig};
pub use console::{ConsoleSink, add_console_sink};
pub use file_sink::{FileSink, format_record};
pub use pager::{
    CommandLocator, DEFAULT_PAGER, DEFAULT_PAGER_FLAGS, PAGER_ENV, Pager, PagerCommand,
    PagerConfig, PagerOutput, PathLocator,
};
pub use view::{OutputView, THROBBER_STEPS};
