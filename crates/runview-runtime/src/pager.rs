#![forbid(unsafe_code)]

//! External pager for long listings.
//!
//! # Resolution
//!
//! 1. `$PAGER`, if set, non-empty, and its first word resolves to a command.
//!    The whole value runs through the platform shell so it may carry flags.
//! 2. Otherwise `less -FRSX` located on `PATH`.
//! 3. Otherwise the pager is unavailable and callers fall back to stdout.
//!
//! # Failure modes
//!
//! Writes never fail from the caller's point of view. When the pager exits
//! early (the user quit `less`), the next write sees a broken pipe, the pipe
//! is closed, and later writes are dropped.

use std::env;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

use runview_core::{OutputError, OutputResult};

/// Environment variable naming a preferred pager command.
pub const PAGER_ENV: &str = "PAGER";
/// Pager program used when `$PAGER` is not usable.
pub const DEFAULT_PAGER: &str = "less";
/// Flags passed to [`DEFAULT_PAGER`].
pub const DEFAULT_PAGER_FLAGS: &str = "-FRSX";

/// Finds executables by name.
pub trait CommandLocator {
    /// Full path of `name`, if it can be executed.
    fn find_command(&self, name: &str) -> Option<PathBuf>;
}

/// Searches `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathLocator;

impl CommandLocator for PathLocator {
    fn find_command(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}

/// A resolved pager invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerCommand {
    /// A command line run through the platform shell.
    Shell(String),
    /// A located program with its arguments.
    Program { path: PathBuf, args: Vec<String> },
}

impl PagerCommand {
    fn to_command(&self) -> Command {
        match self {
            Self::Shell(line) => shell_command(line),
            Self::Program { path, args } => {
                let mut cmd = Command::new(path);
                cmd.args(args);
                cmd
            }
        }
    }
}

#[cfg(unix)]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

#[cfg(not(unix))]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}

/// Pager selection inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerConfig {
    /// Command line preferred over the default program.
    pub override_command: Option<String>,
    pub program: String,
    /// Whitespace-separated flags for `program`.
    pub flags: String,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            override_command: None,
            program: DEFAULT_PAGER.to_string(),
            flags: DEFAULT_PAGER_FLAGS.to_string(),
        }
    }
}

impl PagerConfig {
    /// Defaults, with `$PAGER` as the override when it is non-empty.
    #[must_use]
    pub fn from_env() -> Self {
        let override_command = env::var(PAGER_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());
        Self {
            override_command,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_override(mut self, command: impl Into<String>) -> Self {
        self.override_command = Some(command.into());
        self
    }

    /// Pick the command to run, or `None` when nothing resolves.
    pub fn resolve(&self, locator: &dyn CommandLocator) -> Option<PagerCommand> {
        if let Some(line) = &self.override_command
            && let Some(program) = line.split_whitespace().next()
            && locator.find_command(program).is_some()
        {
            return Some(PagerCommand::Shell(line.clone()));
        }
        let path = locator.find_command(&self.program)?;
        Some(PagerCommand::Program {
            path,
            args: self.flags.split_whitespace().map(str::to_string).collect(),
        })
    }
}

/// A running pager process fed through its stdin.
pub struct Pager {
    child: Child,
    stdin: Option<ChildStdin>,
    command: PagerCommand,
}

impl fmt::Debug for Pager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("pid", &self.child.id())
            .field("command", &self.command)
            .field("open", &self.stdin.is_some())
            .finish()
    }
}

impl Pager {
    /// Resolve from the environment and spawn.
    pub fn new() -> OutputResult<Self> {
        Self::from_config(&PagerConfig::from_env(), &PathLocator)
    }

    pub fn from_config(config: &PagerConfig, locator: &dyn CommandLocator) -> OutputResult<Self> {
        let command = config.resolve(locator).ok_or_else(|| {
            OutputError::PagerUnavailable(format!(
                "'{}' not found and ${PAGER_ENV} is not usable",
                config.program
            ))
        })?;
        Self::spawn(command)
    }

    pub fn spawn(command: PagerCommand) -> OutputResult<Self> {
        let mut child = command.to_command().stdin(Stdio::piped()).spawn()?;
        let stdin = child.stdin.take();
        tracing::debug!(?command, pid = child.id(), "pager spawned");
        Ok(Self {
            child,
            stdin,
            command,
        })
    }

    #[must_use]
    pub fn command(&self) -> &PagerCommand {
        &self.command
    }

    /// Whether the pipe is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.stdin.is_some()
    }

    /// Send text to the pager. Failures close the pipe silently.
    pub fn write(&mut self, text: &str) {
        let Some(stdin) = self.stdin.as_mut() else {
            return;
        };
        if let Err(err) = stdin.write_all(text.as_bytes()) {
            tracing::debug!(%err, "pager pipe closed");
            self.stdin = None;
        }
    }

    /// Close the pipe and wait for the pager to exit.
    pub fn close(&mut self) {
        drop(self.stdin.take());
        let _ = self.child.wait();
    }
}

impl Drop for Pager {
    fn drop(&mut self) {
        self.close();
    }
}

/// Where list-mode text goes.
pub enum PagerOutput {
    Pager(Pager),
    Stdout(io::Stdout),
    Writer(Box<dyn Write + Send>),
}

impl fmt::Debug for PagerOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pager(pager) => f.debug_tuple("Pager").field(pager).finish(),
            Self::Stdout(_) => f.write_str("Stdout"),
            Self::Writer(_) => f.write_str("Writer"),
        }
    }
}

impl PagerOutput {
    /// A pager resolved from the environment, or stdout if none is available.
    #[must_use]
    pub fn get_or_fallback() -> Self {
        Self::from_config_or_fallback(&PagerConfig::from_env(), &PathLocator)
    }

    #[must_use]
    pub fn from_config_or_fallback(config: &PagerConfig, locator: &dyn CommandLocator) -> Self {
        match Pager::from_config(config, locator) {
            Ok(pager) => Self::Pager(pager),
            Err(err) => {
                tracing::debug!(%err, "falling back to stdout");
                Self::Stdout(io::stdout())
            }
        }
    }

    #[must_use]
    pub fn stdout() -> Self {
        Self::Stdout(io::stdout())
    }

    pub fn writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self::Writer(Box::new(writer))
    }

    #[must_use]
    pub fn is_pager(&self) -> bool {
        matches!(self, Self::Pager(_))
    }

    /// Write and flush. Errors are dropped.
    pub fn write(&mut self, text: &str) {
        match self {
            Self::Pager(pager) => pager.write(text),
            Self::Stdout(stdout) => {
                let mut out = stdout.lock();
                let _ = out.write_all(text.as_bytes()).and_then(|()| out.flush());
            }
            Self::Writer(writer) => {
                let _ = writer.write_all(text.as_bytes()).and_then(|()| writer.flush());
            }
        }
    }

    /// Close the pager, if any, and wait for it.
    pub fn close(&mut self) {
        if let Self::Pager(pager) = self {
            pager.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Resolves only the names it was given.
    struct FakeLocator(HashMap<&'static str, &'static str>);

    impl FakeLocator {
        fn with(names: &[(&'static str, &'static str)]) -> Self {
            Self(names.iter().copied().collect())
        }
    }

    impl CommandLocator for FakeLocator {
        fn find_command(&self, name: &str) -> Option<PathBuf> {
            self.0.get(name).map(PathBuf::from)
        }
    }

    #[test]
    fn default_is_less_with_flags() {
        let config = PagerConfig::default();
        let locator = FakeLocator::with(&[("less", "/usr/bin/less")]);
        assert_eq!(
            config.resolve(&locator),
            Some(PagerCommand::Program {
                path: PathBuf::from("/usr/bin/less"),
                args: vec!["-FRSX".to_string()],
            })
        );
    }

    #[test]
    fn usable_override_wins() {
        let config = PagerConfig::default().with_override("most -s");
        let locator = FakeLocator::with(&[("less", "/usr/bin/less"), ("most", "/usr/bin/most")]);
        assert_eq!(
            config.resolve(&locator),
            Some(PagerCommand::Shell("most -s".to_string()))
        );
    }

    #[test]
    fn unresolvable_override_falls_back_to_default() {
        let config = PagerConfig::default().with_override("nonexistent-pager");
        let locator = FakeLocator::with(&[("less", "/bin/less")]);
        assert!(matches!(
            config.resolve(&locator),
            Some(PagerCommand::Program { .. })
        ));
    }

    #[test]
    fn nothing_resolves() {
        let config = PagerConfig::default().with_override("   ");
        let locator = FakeLocator::with(&[]);
        assert_eq!(config.resolve(&locator), None);
        assert!(matches!(
            Pager::from_config(&config, &locator),
            Err(OutputError::PagerUnavailable(_))
        ));
    }

    #[test]
    fn fallback_is_stdout_when_unavailable() {
        let locator = FakeLocator::with(&[]);
        let output = PagerOutput::from_config_or_fallback(&PagerConfig::default(), &locator);
        assert!(!output.is_pager());
        assert!(matches!(output, PagerOutput::Stdout(_)));
    }

    #[cfg(unix)]
    #[test]
    fn pager_receives_text() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("paged.txt");
        let line = format!("cat > '{}'", out.display());

        let mut pager = Pager::spawn(PagerCommand::Shell(line)).unwrap();
        pager.write("alpha\n");
        pager.write("beta");
        pager.close();
        assert!(!pager.is_open());

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "alpha\nbeta");
    }

    #[cfg(unix)]
    #[test]
    fn writes_after_pager_exit_are_dropped() {
        let mut pager = Pager::spawn(PagerCommand::Shell("exit 0".to_string())).unwrap();
        let _ = pager.child.wait();
        let chunk = "x".repeat(1 << 16);
        for _ in 0..8 {
            pager.write(&chunk);
        }
        assert!(!pager.is_open());
        pager.write("ignored");
    }

    #[test]
    fn writer_output_receives_text() {
        let writer = crate::test_util::SharedWriter::new();
        let mut output = PagerOutput::writer(writer.clone());
        output.write("one\n");
        output.write("two");
        output.close();
        assert_eq!(writer.snapshot(), "one\ntwo");
    }
}
