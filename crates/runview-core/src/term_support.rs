#![forbid(unsafe_code)]

//! Terminal color gating for status output.
//!
//! [`TermSupport`] holds one escape prefix per semantic [`Category`] plus a
//! terminator. It is either fully active (classic 16-color SGR prefixes and a
//! reset terminator) or fully disabled (every field empty). There is no mixed
//! state: [`disable`](TermSupport::disable) clears all fields at once.
//!
//! # Detection Strategy
//!
//! Color is enabled only when both checks pass:
//! - standard output is a terminal (`crossterm::tty::IsTty`)
//! - `TERM` matches [`ALLOWED_TERMS`] exactly (case-sensitive)
//!
//! `NO_COLOR` (any value) disables color regardless of the other checks.
//!
//! # Status Tokens
//!
//! Status tokens (`PASS`, `FAIL`, ...) are prefixed with a single-column
//! cursor-back sequence so they overwrite a previously printed placeholder
//! (typically a throbber glyph). When disabled, the cursor-back is empty too,
//! so a piped log never contains cursor movement.
//!
//! ```
//! use runview_core::term_support::{Category, Status, TermSupport};
//!
//! let plain = TermSupport::disabled();
//! assert_eq!(plain.decorate(Category::Pass, "ok"), "ok");
//! assert_eq!(plain.status_str(Status::NotFound), "NOT_FOUND");
//! ```

use std::env;
use std::fmt;

use crossterm::tty::IsTty;

/// Terminal types known to render the classic SGR color prefixes.
pub const ALLOWED_TERMS: &[&str] = &[
    "linux",
    "xterm",
    "xterm-256color",
    "vt100",
    "screen",
    "screen-256color",
];

const COLOR_BLUE: &str = "\x1b[94m";
const COLOR_GREEN: &str = "\x1b[92m";
const COLOR_YELLOW: &str = "\x1b[93m";
const COLOR_RED: &str = "\x1b[91m";
const CONTROL_END: &str = "\x1b[0m";

/// Moves the cursor one column left (CUB 1).
pub const MOVE_BACK: &str = "\x1b[1D";

/// Semantic category used to pick a color prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Section headers (blue).
    Header,
    /// Passing or healthy output (green).
    Pass,
    /// Skipped work (yellow).
    Skip,
    /// Failures (red).
    Fail,
    /// Errors (red).
    Error,
    /// Missing tests or resources (yellow).
    NotFound,
    /// Warnings (yellow).
    Warn,
    /// Partial progress (yellow).
    Partial,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Header,
        Self::Pass,
        Self::Skip,
        Self::Fail,
        Self::Error,
        Self::NotFound,
        Self::Warn,
        Self::Partial,
    ];
}

/// Final status of a test, rendered as a fixed literal token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Pass,
    Fail,
    Error,
    Skip,
    Warn,
    NotFound,
}

impl Status {
    /// The literal token text. These are part of the output contract.
    #[must_use]
    pub const fn literal(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Error => "ERROR",
            Self::Skip => "SKIP",
            Self::Warn => "WARN",
            Self::NotFound => "NOT_FOUND",
        }
    }

    /// The color category used for this token.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Pass => Category::Pass,
            Self::Fail => Category::Fail,
            Self::Error => Category::Error,
            Self::Skip => Category::Skip,
            Self::Warn => Category::Warn,
            Self::NotFound => Category::NotFound,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}

#[derive(Debug, Clone)]
struct DetectInputs {
    stdout_is_tty: bool,
    term: Option<String>,
    no_color: bool,
}

impl DetectInputs {
    fn from_env() -> Self {
        Self {
            stdout_is_tty: std::io::stdout().is_tty(),
            term: env::var("TERM").ok(),
            no_color: env::var_os("NO_COLOR").is_some(),
        }
    }

    fn color_capable(&self) -> bool {
        if self.no_color || !self.stdout_is_tty {
            return false;
        }
        self.term
            .as_deref()
            .is_some_and(|term| ALLOWED_TERMS.contains(&term))
    }
}

/// Color prefixes and terminator for the current output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermSupport {
    header: &'static str,
    pass: &'static str,
    skip: &'static str,
    fail: &'static str,
    error: &'static str,
    not_found: &'static str,
    warn: &'static str,
    partial: &'static str,
    end: &'static str,
    move_back: &'static str,
}

impl Default for TermSupport {
    fn default() -> Self {
        Self::detect()
    }
}

impl TermSupport {
    /// Detect color support from stdout and `TERM`.
    ///
    /// Reads the environment once; the result never changes afterwards
    /// except through [`disable`](Self::disable).
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_from_inputs(&DetectInputs::from_env())
    }

    /// Build for an explicit terminal type, as if stdout were a terminal.
    #[must_use]
    pub fn for_term(term: &str) -> Self {
        Self::detect_from_inputs(&DetectInputs {
            stdout_is_tty: true,
            term: Some(term.to_string()),
            no_color: false,
        })
    }

    fn detect_from_inputs(inputs: &DetectInputs) -> Self {
        let mut support = Self::colored();
        if !inputs.color_capable() {
            support.disable();
        }
        support
    }

    /// All prefixes active.
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            header: COLOR_BLUE,
            pass: COLOR_GREEN,
            skip: COLOR_YELLOW,
            fail: COLOR_RED,
            error: COLOR_RED,
            not_found: COLOR_YELLOW,
            warn: COLOR_YELLOW,
            partial: COLOR_YELLOW,
            end: CONTROL_END,
            move_back: MOVE_BACK,
        }
    }

    /// All prefixes empty; decoration is plain concatenation.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            header: "",
            pass: "",
            skip: "",
            fail: "",
            error: "",
            not_found: "",
            warn: "",
            partial: "",
            end: "",
            move_back: "",
        }
    }

    /// Drop every escape sequence. Irreversible for this value.
    pub fn disable(&mut self) {
        *self = Self::disabled();
    }

    /// Whether escape sequences are emitted.
    #[must_use]
    #[inline]
    pub const fn is_enabled(&self) -> bool {
        !self.end.is_empty()
    }

    /// Escape prefix for a category (empty when disabled).
    #[must_use]
    pub const fn prefix(&self, category: Category) -> &'static str {
        match category {
            Category::Header => self.header,
            Category::Pass => self.pass,
            Category::Skip => self.skip,
            Category::Fail => self.fail,
            Category::Error => self.error,
            Category::NotFound => self.not_found,
            Category::Warn => self.warn,
            Category::Partial => self.partial,
        }
    }

    /// Reset sequence appended after decorated text (empty when disabled).
    #[must_use]
    #[inline]
    pub const fn terminator(&self) -> &'static str {
        self.end
    }

    /// Cursor-back sequence (empty when disabled).
    #[must_use]
    #[inline]
    pub const fn move_back(&self) -> &'static str {
        self.move_back
    }

    /// `prefix(category) + text + terminator`.
    #[must_use]
    pub fn decorate(&self, category: Category, text: &str) -> String {
        let prefix = self.prefix(category);
        let mut out = String::with_capacity(prefix.len() + text.len() + self.end.len());
        out.push_str(prefix);
        out.push_str(text);
        out.push_str(self.end);
        out
    }

    /// Header text (blue).
    #[must_use]
    pub fn header_str(&self, msg: &str) -> String {
        self.decorate(Category::Header, msg)
    }

    /// Failure header text (red).
    #[must_use]
    pub fn fail_header_str(&self, msg: &str) -> String {
        self.decorate(Category::Fail, msg)
    }

    /// Text signalling things are going as expected (green).
    #[must_use]
    pub fn healthy_str(&self, msg: &str) -> String {
        self.decorate(Category::Pass, msg)
    }

    /// Text signalling partial progress (yellow).
    #[must_use]
    pub fn partial_str(&self, msg: &str) -> String {
        self.decorate(Category::Partial, msg)
    }

    /// Cursor-back, category color, literal token, terminator.
    #[must_use]
    pub fn status_str(&self, status: Status) -> String {
        let mut out = String::from(self.move_back);
        out.push_str(&self.decorate(status.category(), status.literal()));
        out
    }

    #[must_use]
    pub fn pass_str(&self) -> String {
        self.status_str(Status::Pass)
    }

    #[must_use]
    pub fn skip_str(&self) -> String {
        self.status_str(Status::Skip)
    }

    #[must_use]
    pub fn fail_str(&self) -> String {
        self.status_str(Status::Fail)
    }

    #[must_use]
    pub fn error_str(&self) -> String {
        self.status_str(Status::Error)
    }

    #[must_use]
    pub fn not_found_str(&self) -> String {
        self.status_str(Status::NotFound)
    }

    #[must_use]
    pub fn warn_str(&self) -> String {
        self.status_str(Status::Warn)
    }
}
