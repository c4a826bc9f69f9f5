//! Fuzz target: `ActionToken::parse`
//!
//! Any line must classify without panicking.  Accepted sleeps can be
//! handed to the clock as-is; `from_line` is inert exactly when `parse`
//! fails.
//!
//! cargo fuzz run fuzz_action_line

#![no_main]

use libfuzzer_sys::fuzz_target;
use placecard::actions::ActionToken;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);

    let parsed = ActionToken::parse(&line);
    if let Ok(ActionToken::Sleep { duration }) = &parsed {
        assert!(duration.as_secs_f64().is_finite(), "bad sleep {duration:?}");
    }
    assert_eq!(parsed.is_err(), ActionToken::from_line(&line).is_invalid());
});
