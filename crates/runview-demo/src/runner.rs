#![forbid(unsafe_code)]

//! Simulated test run driven through an [`OutputView`].

use std::thread;
use std::time::{Duration, Instant};

use runview::{LineBufferedLogSink, LoggingContext, OutputView, Status, channel};

/// Scripted outcome of one simulated test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimTest {
    pub name: &'static str,
    pub status: Status,
    /// Throbber ticks before the result.
    pub ticks: usize,
}

const CATALOG: &[SimTest] = &[
    SimTest { name: "boot_guest", status: Status::Pass, ticks: 6 },
    SimTest { name: "check_kernel_cmdline", status: Status::Pass, ticks: 3 },
    SimTest { name: "network_bridge", status: Status::Fail, ticks: 8 },
    SimTest { name: "gpu_passthrough", status: Status::Skip, ticks: 0 },
    SimTest { name: "disk_latency", status: Status::Warn, ticks: 5 },
    SimTest { name: "missing_fixture", status: Status::NotFound, ticks: 0 },
    SimTest { name: "shutdown_guest", status: Status::Error, ticks: 4 },
];

/// The first `count` tests, cycling through the catalog.
#[must_use]
pub fn plan(count: usize) -> Vec<SimTest> {
    CATALOG.iter().copied().cycle().take(count).collect()
}

/// Tally of final statuses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Page test names, one per line.
pub fn list(view: &mut OutputView, tests: &[SimTest]) {
    view.log_ui_header("Available tests:");
    for test in tests {
        view.log(test.name, runview::Level::INFO, false);
    }
}

/// Run every test, animating the throbber between `tick` sleeps.
pub fn run(
    view: &mut OutputView,
    context: &LoggingContext,
    tests: &[SimTest],
    tick: Duration,
) -> Summary {
    let mut summary = Summary::default();
    let total = tests.len();
    view.log_ui_header(&format!("Running {total} tests"));

    for (index, test) in tests.iter().enumerate() {
        let started = Instant::now();
        view.log(
            &format!("({}/{total}) {}: ", index + 1, test.name),
            runview::Level::INFO,
            true,
        );
        tracing::info!(target: "runview.test", test = test.name, "starting");

        // Guest console output arrives in arbitrary fragments.
        let mut console = LineBufferedLogSink::new(context.logger(channel::PLATFORM))
            .with_prefix(format!("[{}] ", test.name));
        for tick_no in 0..test.ticks {
            thread::sleep(tick);
            let from_test = tick_no % 3 != 2;
            view.log_ui_throbber_progress(from_test);
            console.write(&format!("tick {tick_no}"));
            if from_test {
                console.write(" ok\n");
            }
        }
        console.flush();

        let elapsed = started.elapsed().as_secs_f64();
        if test.ticks == 0 {
            // Nothing drawn yet; give the status token a column to overwrite.
            view.log(" ", runview::Level::INFO, true);
        }
        view.log_ui_status(test.status, elapsed);
        tracing::debug!(target: "runview.test", test = test.name, status = test.status.literal(), "finished");

        match test.status {
            Status::Pass => summary.passed += 1,
            Status::Skip => summary.skipped += 1,
            Status::Fail | Status::Error | Status::Warn | Status::NotFound => summary.failed += 1,
        }
    }

    if summary.failed == 0 {
        view.log_ui_healthy(&format!("{} passed, {} skipped", summary.passed, summary.skipped), false);
    } else {
        view.log_ui_error(&format!(
            "{} passed, {} failed, {} skipped",
            summary.passed, summary.failed, summary.skipped
        ));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use runview::{CaptureSink, LevelFilter, PagerOutput, TermSupport, ViewConfig};

    fn capture_view(list_mode: bool) -> (OutputView, LoggingContext, CaptureSink) {
        let context = LoggingContext::new();
        let console = CaptureSink::new();
        context.attach(&[channel::APP], LevelFilter::TRACE, console.clone());
        let view = OutputView::with_output(
            context.clone(),
            ViewConfig::default().list_mode(list_mode),
            TermSupport::disabled(),
            PagerOutput::writer(std::io::sink()),
        );
        (view, context, console)
    }

    #[test]
    fn plan_cycles_catalog() {
        let tests = plan(CATALOG.len() + 2);
        assert_eq!(tests[CATALOG.len()].name, CATALOG[0].name);
        assert_eq!(tests.len(), CATALOG.len() + 2);
    }

    #[test]
    fn run_reports_each_status() {
        let (mut view, context, console) = capture_view(false);
        let summary = run(&mut view, &context, &plan(CATALOG.len()), Duration::ZERO);

        assert_eq!(summary, Summary { passed: 2, failed: 4, skipped: 1 });
        let messages = console.messages();
        assert_eq!(messages.first().map(String::as_str), Some("Running 7 tests"));
        assert!(messages.iter().any(|m| m == "SKIP"));
        assert!(messages.iter().any(|m| m.starts_with("FAIL (")));
        assert_eq!(
            messages.last().map(String::as_str),
            Some("2 passed, 4 failed, 1 skipped")
        );
    }

    #[test]
    fn guest_output_reaches_platform_channel() {
        let (mut view, context, _console) = capture_view(false);
        let platform = CaptureSink::new();
        context.attach(&[channel::PLATFORM], LevelFilter::TRACE, platform.clone());

        run(&mut view, &context, &plan(1), Duration::ZERO);

        let lines = platform.messages();
        assert_eq!(lines.first().map(String::as_str), Some("[boot_guest] tick 0 ok"));
        assert!(lines.iter().any(|l| l == "[boot_guest] tick 2tick 3 ok"));
    }

    #[test]
    fn list_mode_bypasses_console() {
        let (mut view, _context, console) = capture_view(true);
        list(&mut view, &plan(3));
        assert!(console.records().is_empty());
    }
}
