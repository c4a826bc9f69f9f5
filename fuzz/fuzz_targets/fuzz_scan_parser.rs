//! Fuzz target: `parse_scan`
//!
//! Feeds arbitrary text to the scan parser and checks that it never
//! panics, that every emitted BSSID is lower case, and that no BSSID is
//! emitted twice.
//!
//! cargo fuzz run fuzz_scan_parser

#![no_main]

use std::collections::HashSet;

use libfuzzer_sys::fuzz_target;
use placecard::location::parse_scan;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let found = parse_scan(&text);

    let mut seen = HashSet::new();
    for obs in &found {
        assert_eq!(obs.bssid, obs.bssid.to_ascii_lowercase(), "BSSID not lower-cased");
        assert!(seen.insert(obs.bssid.clone()), "duplicate BSSID {}", obs.bssid);
    }
});
