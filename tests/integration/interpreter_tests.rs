//! Integration tests for action scripts played through the interpreter.

use std::fs;
use std::time::Duration;

use placecard::actions::{ActionInterpreter, ActionToken, RunReport};
use placecard::config::SystemConfig;
use placecard::render::{Bitmap, Renderer, bmp};

use crate::mock_hw::{InstantClock, MockPanel, PanelCall};

fn interpreter() -> ActionInterpreter {
    ActionInterpreter::new(Renderer::from_config(&SystemConfig::default()))
}

#[test]
fn sleep_then_text_with_a_bogus_line_in_between() {
    let actions = ActionToken::parse_all(&["sleep 0.5", "bogus line", "display message Hello"]);
    let mut panel = MockPanel::default();
    let mut clock = InstantClock::default();

    let report = interpreter()
        .run(&actions, std::path::Path::new("."), &mut panel, &mut clock)
        .unwrap();

    assert_eq!(report, RunReport { executed: 2, skipped: 1, failed: 0 });
    assert_eq!(clock.slept, vec![Duration::from_millis(500)]);
    assert_eq!(panel.renders(), 1);
    assert!(matches!(panel.calls.last(), Some(PanelCall::Full { black }) if *black > 0));
}

#[test]
fn oversized_sleep_is_skipped_and_the_sequence_continues() {
    let actions = ActionToken::parse_all(&["sleep 1e20", "display message after"]);
    let mut panel = MockPanel::default();
    let mut clock = InstantClock::default();

    let report = interpreter()
        .run(&actions, std::path::Path::new("."), &mut panel, &mut clock)
        .unwrap();

    assert_eq!(report, RunReport { executed: 1, skipped: 1, failed: 0 });
    assert!(clock.slept.is_empty());
    assert_eq!(panel.renders(), 1);
}

#[test]
fn images_resolve_against_the_presentation_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut logo = Bitmap::new(16, 8);
    logo.fill_rect(0, 0, 16, 8);
    fs::write(dir.path().join("logo.bmp"), bmp::encode_1bpp(&logo)).unwrap();
    fs::write(dir.path().join("logo.png"), b"not a bitmap").unwrap();

    let actions = ActionToken::parse_all(&[
        "display image logo.bmp",
        "displayPartial image missing.bmp",
        "display image logo.png",
    ]);
    let mut panel = MockPanel::default();
    let mut clock = InstantClock::default();

    let report = interpreter().run(&actions, dir.path(), &mut panel, &mut clock).unwrap();

    assert_eq!(report, RunReport { executed: 1, skipped: 2, failed: 0 });
    assert_eq!(panel.calls, vec![PanelCall::Full { black: 16 * 8 }]);
    assert!(panel.frames[0].is_black(0, 0));
    assert!(!panel.frames[0].is_black(16, 0));
}

#[test]
fn panel_failures_do_not_abort_the_sequence() {
    let actions = ActionToken::parse_all(&["display message one", "sleep 1", "clear"]);
    let mut panel = MockPanel { broken: true, ..MockPanel::default() };
    let mut clock = InstantClock::default();

    let report = interpreter()
        .run(&actions, std::path::Path::new("."), &mut panel, &mut clock)
        .unwrap();

    assert_eq!(report, RunReport { executed: 2, skipped: 0, failed: 1 });
    assert_eq!(clock.slept.len(), 1);
    assert_eq!(panel.calls, vec![PanelCall::Init, PanelCall::Clear(0xFF)]);
}

#[test]
fn interrupt_during_sleep_stops_the_run() {
    let actions = ActionToken::parse_all(&["sleep 10", "display message after"]);
    let mut panel = MockPanel::default();
    let mut clock = InstantClock::interrupt_on(1);

    let result = interpreter().run(&actions, std::path::Path::new("."), &mut panel, &mut clock);

    assert!(result.is_err());
    assert_eq!(panel.renders(), 0);
}
