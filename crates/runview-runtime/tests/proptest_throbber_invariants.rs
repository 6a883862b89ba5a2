//! Property tests for the throbber phase.

use proptest::prelude::*;
use runview_core::{CaptureSink, LevelFilter, LoggingContext, TermSupport, channel};
use runview_runtime::{OutputView, PagerOutput, THROBBER_STEPS, ViewConfig};

fn view_with_console() -> (OutputView, CaptureSink) {
    let context = LoggingContext::new();
    let console = CaptureSink::new();
    context.attach(&[channel::APP], LevelFilter::TRACE, console.clone());
    let view = OutputView::with_output(
        context,
        ViewConfig::default(),
        TermSupport::disabled(),
        PagerOutput::stdout(),
    );
    (view, console)
}

proptest! {
    #[test]
    fn phase_depends_only_on_call_count(sources in proptest::collection::vec(any::<bool>(), 0..40)) {
        let (mut view, console) = view_with_console();
        for &from_test in &sources {
            view.log_ui_throbber_progress(from_test);
        }

        prop_assert_eq!(view.throbber_position(), sources.len() % THROBBER_STEPS.len());

        let expected: Vec<String> = (0..sources.len())
            .map(|i| THROBBER_STEPS[i % THROBBER_STEPS.len()].to_string())
            .collect();
        prop_assert_eq!(console.messages(), expected);
        prop_assert!(console.records().iter().all(|r| r.skip_newline));
    }

    #[test]
    fn four_calls_return_to_start(start in 0usize..4, from_test in any::<bool>()) {
        let (mut view, _console) = view_with_console();
        for _ in 0..start {
            view.log_ui_throbber_progress(!from_test);
        }
        let before = view.throbber_position();
        for _ in 0..4 {
            view.log_ui_throbber_progress(from_test);
        }
        prop_assert_eq!(view.throbber_position(), before);
    }
}
