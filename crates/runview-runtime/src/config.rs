#![forbid(unsafe_code)]

//! View configuration.

use std::env;

use runview_core::channel;

/// Environment variable that turns on list mode.
pub const LIST_MODE_ENV: &str = "RUNVIEW_LIST_MODE";

/// Channels a view writes to and whether it pages its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    /// Channel for interactive UI output.
    pub console_channel: String,
    /// General test output; receives the run's file sink.
    pub test_channel: String,
    /// Platform-specific output; also receives the run's file sink.
    pub platform_channel: String,
    /// Send UI text to a pager instead of the console channel.
    pub list_mode: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            console_channel: channel::APP.to_string(),
            test_channel: channel::TEST.to_string(),
            platform_channel: channel::PLATFORM.to_string(),
            list_mode: false,
        }
    }
}

impl ViewConfig {
    /// Defaults, with `RUNVIEW_LIST_MODE` applied.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = env::var(LIST_MODE_ENV) {
            config.list_mode = parse_flag(&value);
        }
        config
    }

    #[must_use]
    pub fn list_mode(mut self, list_mode: bool) -> Self {
        self.list_mode = list_mode;
        self
    }

    #[must_use]
    pub fn console_channel(mut self, name: impl Into<String>) -> Self {
        self.console_channel = name.into();
        self
    }

    #[must_use]
    pub fn test_channel(mut self, name: impl Into<String>) -> Self {
        self.test_channel = name.into();
        self
    }

    #[must_use]
    pub fn platform_channel(mut self, name: impl Into<String>) -> Self {
        self.platform_channel = name.into();
        self
    }
}

pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_standard_channels() {
        let config = ViewConfig::default();
        assert_eq!(config.console_channel, "runview.app");
        assert_eq!(config.test_channel, "runview.test");
        assert_eq!(config.platform_channel, "runview.platform");
        assert!(!config.list_mode);
    }

    #[test]
    fn builder_setters() {
        let config = ViewConfig::default()
            .list_mode(true)
            .console_channel("ui")
            .test_channel("t")
            .platform_channel("p");
        assert!(config.list_mode);
        assert_eq!(config.console_channel, "ui");
        assert_eq!(config.test_channel, "t");
        assert_eq!(config.platform_channel, "p");
    }

    #[test]
    fn flag_parsing() {
        for on in ["1", "true", "YES", " yes "] {
            assert!(parse_flag(on), "{on:?}");
        }
        for off in ["", "0", "false", "no", "maybe"] {
            assert!(!parse_flag(off), "{off:?}");
        }
    }
}
