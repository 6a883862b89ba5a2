//! Per-run log file behavior through the public view API.

use runview_core::{LevelFilter, LoggingContext, TermSupport, channel};
use runview_runtime::{OutputView, PagerOutput, ViewConfig};

fn view(context: &LoggingContext) -> OutputView {
    OutputView::with_output(
        context.clone(),
        ViewConfig::default(),
        TermSupport::disabled(),
        PagerOutput::stdout(),
    )
}

fn is_record_line(line: &str) -> bool {
    // "HH:MM:SS " + 10-column module + " L" + 4 digits + " " + 5-column level + "| "
    let bytes = line.as_bytes();
    line.len() >= 33
        && bytes[2] == b':'
        && bytes[5] == b':'
        && bytes[8] == b' '
        && &line[19..21] == " L"
        && line[21..25].bytes().all(|b| b.is_ascii_digit())
        && &line[31..33] == "| "
}

#[test]
fn both_channels_reach_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    let context = LoggingContext::new();
    let mut view = view(&context);

    view.start_file_logging(&path, LevelFilter::DEBUG, "run-1")
        .unwrap();
    context.logger(channel::TEST).info("from test");
    context.logger(channel::PLATFORM).warn("from platform");
    context.logger(channel::APP).info("console only");
    view.stop_file_logging().unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2, "{contents}");
    assert!(lines.iter().all(|line| is_record_line(line)), "{contents}");
    assert!(lines[0].ends_with("INFO | from test"));
    assert!(lines[1].ends_with("WARNI| from platform"));
    assert!(lines[0][9..19].starts_with("file_loggi"));
}

#[test]
fn writes_after_stop_do_not_reach_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    let context = LoggingContext::new();
    let mut view = view(&context);

    view.start_file_logging(&path, LevelFilter::TRACE, "run-2")
        .unwrap();
    context.logger(channel::TEST).info("kept");
    view.stop_file_logging().unwrap();
    context.logger(channel::TEST).info("after stop");
    context.logger(channel::PLATFORM).error("after stop");

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 1);
    assert!(!contents.contains("after stop"));
}

#[test]
fn threshold_filters_file_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    let context = LoggingContext::new();
    let mut view = view(&context);

    view.start_file_logging(&path, LevelFilter::INFO, "run-3")
        .unwrap();
    context.logger(channel::TEST).debug("too verbose");
    context.logger(channel::TEST).error("important");
    view.stop_file_logging().unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("too verbose"));
    assert!(contents.contains("ERROR| important"));
}

#[test]
fn restart_after_stop_uses_new_file() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.log");
    let second = dir.path().join("second.log");
    let context = LoggingContext::new();
    let mut view = view(&context);

    view.start_file_logging(&first, LevelFilter::DEBUG, "a").unwrap();
    context.logger(channel::TEST).info("one");
    view.stop_file_logging().unwrap();

    view.start_file_logging(&second, LevelFilter::DEBUG, "b").unwrap();
    context.logger(channel::TEST).info("two");
    view.stop_file_logging().unwrap();

    let first = std::fs::read_to_string(&first).unwrap();
    let second = std::fs::read_to_string(&second).unwrap();
    assert!(first.contains("one") && !first.contains("two"));
    assert!(second.contains("two") && !second.contains("one"));
}

#[test]
fn missing_directory_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("run.log");
    let context = LoggingContext::new();
    let mut view = view(&context);

    let err = view
        .start_file_logging(&path, LevelFilter::DEBUG, "x")
        .unwrap_err();
    assert!(matches!(err, runview_core::OutputError::Io(_)));
    assert!(!view.is_file_logging());
    assert_eq!(context.sink_count(), 0);
}
