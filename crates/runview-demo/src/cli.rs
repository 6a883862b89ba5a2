#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo runner.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `RUNVIEW_DEMO_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;

use runview::LevelFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
runview demo: a simulated test run

USAGE:
    runview-demo [OPTIONS]

OPTIONS:
    --list               List test names through the pager instead of running them
    --tests=N            Number of simulated tests (default: 6)
    --log-file=PATH      Write the run's log to PATH
    --log-level=LEVEL    File log threshold: trace|debug|info|warn|error (default: debug)
    --no-color           Disable colors and cursor movement
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    RUNVIEW_DEMO_TESTS       Override --tests
    RUNVIEW_DEMO_LOG_FILE    Override --log-file
    RUNVIEW_DEMO_LOG_LEVEL   Override --log-level
    PAGER                    Pager command for --list (default: less -FRSX)
    NO_COLOR                 Disable colors when set";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Page test names instead of running.
    pub list: bool,
    /// Number of simulated tests.
    pub tests: usize,
    /// Per-run log file.
    pub log_file: Option<PathBuf>,
    /// Threshold for the log file.
    pub log_level: LevelFilter,
    pub color: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            list: false,
            tests: 6,
            log_file: None,
            log_level: LevelFilter::DEBUG,
            color: true,
        }
    }
}

/// What the caller should do after parsing.
#[derive(Debug, PartialEq)]
pub enum Parsed {
    Run(Opts),
    Help,
    Version,
    Invalid(String),
}

impl Opts {
    /// Parse command-line arguments and environment variables, exiting on
    /// `--help`, `--version`, or bad input.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match Self::parse_from(&args, |key| env::var(key).ok()) {
            Parsed::Run(opts) => opts,
            Parsed::Help => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Parsed::Version => {
                println!("runview-demo {VERSION}");
                process::exit(0);
            }
            Parsed::Invalid(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    pub fn parse_from(args: &[String], var: impl Fn(&str) -> Option<String>) -> Parsed {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = var("RUNVIEW_DEMO_TESTS")
            && let Ok(n) = val.parse()
        {
            opts.tests = n;
        }
        if let Some(val) = var("RUNVIEW_DEMO_LOG_FILE")
            && !val.is_empty()
        {
            opts.log_file = Some(PathBuf::from(val));
        }
        if let Some(val) = var("RUNVIEW_DEMO_LOG_LEVEL")
            && let Ok(level) = val.parse()
        {
            opts.log_level = level;
        }

        // Parse command-line args (override env vars)
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Parsed::Help,
                "--version" | "-V" => return Parsed::Version,
                "--list" => opts.list = true,
                "--no-color" => opts.color = false,
                other => {
                    if let Some(val) = other.strip_prefix("--tests=") {
                        match val.parse() {
                            Ok(n) => opts.tests = n,
                            Err(_) => return Parsed::Invalid(format!("Invalid --tests value: {val}")),
                        }
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        opts.log_file = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--log-level=") {
                        match val.parse() {
                            Ok(level) => opts.log_level = level,
                            Err(_) => {
                                return Parsed::Invalid(format!("Invalid --log-level value: {val}"));
                            }
                        }
                    } else {
                        return Parsed::Invalid(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        Parsed::Run(opts)
    }
}
