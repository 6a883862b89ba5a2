#![forbid(unsafe_code)]

//! runview demo binary entry point.

mod cli;
mod runner;

use std::process;
use std::time::Duration;

use runview::{LoggingContext, OutputView};

const TICK: Duration = Duration::from_millis(120);

fn main() {
    let opts = cli::Opts::parse();
    let context = LoggingContext::new();
    if let Err(e) = runview::install_tracing(&context) {
        eprintln!("Failed to install tracing: {e}");
    }

    let tests = runner::plan(opts.tests);

    if opts.list {
        let mut view = runview::list_view(&context);
        if !opts.color {
            view.disable_colors();
        }
        runner::list(&mut view, &tests);
        return;
    }

    let mut view = runview::interactive_view(&context);
    if !opts.color {
        view.disable_colors();
    }
    if let Some(path) = &opts.log_file {
        let run_id = format!("demo-{}", process::id());
        if let Err(e) = view.start_file_logging(path, opts.log_level, run_id) {
            eprintln!("Failed to open log file {}: {e}", path.display());
            process::exit(1);
        }
    }

    let summary = runner::run(&mut view, &context, &tests, TICK);
    finish(view);

    if summary.failed > 0 {
        process::exit(1);
    }
}

fn finish(mut view: OutputView) {
    if view.is_file_logging()
        && let Err(e) = view.stop_file_logging()
    {
        eprintln!("Failed to close log file: {e}");
    }
}
