//! Integration tests for the Orchestrator → FSM → ports pipeline.
//!
//! Each test lays out a catalogue in a temp directory, scripts the
//! scanner, locator and hotspot, then runs the routine to completion (or
//! interrupt) and checks the events and panel traffic it produced.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};

use placecard::app::events::AppEvent;
use placecard::app::service::Orchestrator;
use placecard::config::SystemConfig;
use placecard::error::{ConnectivityError, LookupError};
use placecard::fsm::StateId;
use placecard::location::Coordinates;

use crate::mock_hw::{InstantClock, MapLocator, PanelCall, Rig, ScriptedLink, ScriptedScanner};

const SCAN: &str = r#"wlan0     Scan completed :
          Cell 01 - Address: AA:AA:AA:AA:AA:01
                    Quality=70/70  Signal level=-40 dBm
                    ESSID:"HomeNet"
          Cell 02 - Address: BB:BB:BB:BB:BB:02
                    Quality=30/70  Signal level=-80 dBm
                    ESSID:"Cafe Free WiFi"
"#;

const STRONG: &str = "aa:aa:aa:aa:aa:01";
const WEAK: &str = "bb:bb:bb:bb:bb:02";
const OFFICE: Coordinates = Coordinates::new(47.37, 8.54);

// ── Fixtures ──────────────────────────────────────────────────

fn config(root: &Path) -> SystemConfig {
    SystemConfig {
        base_dir: root.to_path_buf(),
        connect_attempts: 3,
        repeat_cooldown: 30.0,
        ..SystemConfig::default()
    }
}

fn location(root: &Path, name: &str, body: &Value) -> PathBuf {
    let dir = root.join("images/locations").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.json"), body.to_string()).unwrap();
    dir
}

fn unknown(root: &Path, name: &str, actions: &Value) -> PathBuf {
    let dir = root.join("images/unkown_location").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("actions.json"), actions.to_string()).unwrap();
    dir
}

fn office_rule() -> Value {
    json!({
        "latitude": OFFICE.latitude,
        "longitude": OFFICE.longitude,
        "radius_km": 0.5,
        "matching_ssids": [],
        "matching_bssids": [],
        "actions": ["display message Welcome to the office"]
    })
}

fn orchestrator(config: SystemConfig) -> Orchestrator<StdRng> {
    Orchestrator::new(config, StdRng::seed_from_u64(7))
}

fn visited(rig: &Rig) -> Vec<StateId> {
    rig.log
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::StateChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect()
}

// ── Happy path ────────────────────────────────────────────────

#[test]
fn located_device_plays_the_matching_presentation() {
    let root = tempfile::tempdir().unwrap();
    let office = location(root.path(), "office", &office_rule());
    let mut rig = Rig::new(
        ScriptedScanner::always(SCAN),
        MapLocator::default().with(STRONG, Ok(Some(OFFICE))),
        ScriptedLink::online(),
    );

    let mut app = orchestrator(config(root.path()));
    app.run(&mut rig.peripherals()).unwrap();

    assert_eq!(app.state(), StateId::Done);
    assert_eq!(
        visited(&rig),
        vec![
            StateId::Connecting,
            StateId::Resolving,
            StateId::Matching,
            StateId::Presenting,
            StateId::Done,
        ]
    );
    assert!(rig.has(&AppEvent::Connected { attempts: 1 }));
    assert!(rig.has(&AppEvent::NetworksScanned(2)));
    assert!(rig.has(&AppEvent::Resolved(OFFICE)));
    assert!(rig.has(&AppEvent::Matched { dir: office.clone() }));
    assert!(rig.has(&AppEvent::PresentationFinished {
        dir: Some(office),
        executed: 1,
        skipped: 0,
        failed: 0,
    }));
    assert_eq!(rig.log.events.last(), Some(&AppEvent::Finished));

    // Strongest first, and nothing after the first hit.
    assert_eq!(rig.locator.asked, vec![STRONG.to_owned()]);
    assert_eq!(rig.link.prepares, 1);
    assert_eq!(rig.clock.slept, vec![Duration::from_secs(1)]);
    assert!(matches!(rig.panel.calls.last(), Some(PanelCall::Full { .. })));
}

#[test]
fn lookup_failures_fall_through_to_weaker_networks() {
    let root = tempfile::tempdir().unwrap();
    location(root.path(), "office", &office_rule());
    let mut rig = Rig::new(
        ScriptedScanner::always(SCAN),
        MapLocator::default()
            .with(STRONG, Err(LookupError::TimedOut))
            .with(WEAK, Ok(Some(OFFICE))),
        ScriptedLink::online(),
    );

    let mut app = orchestrator(config(root.path()));
    app.run(&mut rig.peripherals()).unwrap();

    assert_eq!(rig.locator.asked, vec![STRONG.to_owned(), WEAK.to_owned()]);
    assert!(rig.has(&AppEvent::Resolved(OFFICE)));
    assert!(visited(&rig).contains(&StateId::Presenting));
}

#[test]
fn rejected_catalogue_entries_are_reported_and_skipped() {
    let root = tempfile::tempdir().unwrap();
    let office = location(root.path(), "office", &office_rule());
    let broken = root.path().join("images/locations/broken");
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join("config.json"), "{ not json").unwrap();

    let mut rig = Rig::new(
        ScriptedScanner::always(SCAN),
        MapLocator::default().with(STRONG, Ok(Some(OFFICE))),
        ScriptedLink::online(),
    );
    let mut app = orchestrator(config(root.path()));
    app.run(&mut rig.peripherals()).unwrap();

    assert!(rig.log.events.iter().any(|e| matches!(
        e,
        AppEvent::CatalogueEntryRejected { dir, .. } if *dir == broken
    )));
    assert!(rig.has(&AppEvent::Matched { dir: office }));
}

#[test]
fn ssid_rule_matches_even_when_unresolved() {
    let root = tempfile::tempdir().unwrap();
    let home = location(
        root.path(),
        "home",
        &json!({
            "latitude": 0, "longitude": 0, "radius_km": 0,
            "matching_ssids": ["HomeNet"],
            "matching_bssids": [],
            "actions": ["display messageBold Home sweet home"]
        }),
    );
    let mut rig = Rig::new(
        ScriptedScanner::always(SCAN),
        MapLocator::default(),
        ScriptedLink::online(),
    );

    let mut app = orchestrator(config(root.path()));
    app.run(&mut rig.peripherals()).unwrap();

    assert!(rig.has(&AppEvent::Unresolved { attempted: 2 }));
    assert!(rig.has(&AppEvent::Matched { dir: home }));
}

#[test]
fn panel_failures_are_counted_not_fatal() {
    let root = tempfile::tempdir().unwrap();
    let office = location(root.path(), "office", &office_rule());
    let mut rig = Rig::new(
        ScriptedScanner::always(SCAN),
        MapLocator::default().with(STRONG, Ok(Some(OFFICE))),
        ScriptedLink::online(),
    );
    rig.panel.broken = true;

    let mut app = orchestrator(config(root.path()));
    app.run(&mut rig.peripherals()).unwrap();

    assert_eq!(app.state(), StateId::Done);
    assert!(rig.has(&AppEvent::PresentationFinished {
        dir: Some(office),
        executed: 0,
        skipped: 0,
        failed: 1,
    }));
}

// ── Hotspot ───────────────────────────────────────────────────

#[test]
fn connects_after_retries() {
    let root = tempfile::tempdir().unwrap();
    let mut rig = Rig::new(
        ScriptedScanner::always(SCAN),
        MapLocator::default(),
        ScriptedLink::after(2),
    );
    let mut cfg = config(root.path());
    cfg.connect_attempts = 5;

    let mut app = orchestrator(cfg);
    app.run(&mut rig.peripherals()).unwrap();

    assert_eq!(rig.link.attempts, 3);
    assert!(rig.has(&AppEvent::Connected { attempts: 3 }));
    let failed: Vec<u32> = rig
        .log
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ConnectAttemptFailed { attempt, .. } => Some(*attempt),
            _ => None,
        })
        .collect();
    assert_eq!(failed, vec![1, 2]);
    assert_eq!(rig.scanner.scans, 1);
}

#[test]
fn gives_up_after_the_configured_attempts() {
    let root = tempfile::tempdir().unwrap();
    let mut rig = Rig::new(
        ScriptedScanner::always(SCAN),
        MapLocator::default(),
        ScriptedLink::never(),
    );

    let mut app = orchestrator(config(root.path()));
    app.run(&mut rig.peripherals()).unwrap();

    assert_eq!(app.state(), StateId::Done);
    assert_eq!(visited(&rig), vec![StateId::Connecting, StateId::ConnectFailed, StateId::Done]);
    assert_eq!(rig.link.attempts, 3);
    assert_eq!(rig.scanner.scans, 0);
    assert!(rig.clock.slept.contains(&Duration::from_secs(8)));
    assert_eq!(rig.log.events.last(), Some(&AppEvent::Finished));
}

#[test]
fn bad_credentials_fail_without_attempting() {
    let root = tempfile::tempdir().unwrap();
    let mut link = ScriptedLink::online();
    link.prepare_result = Err(ConnectivityError::InvalidPassword);
    let mut rig = Rig::new(ScriptedScanner::always(SCAN), MapLocator::default(), link);

    let mut app = orchestrator(config(root.path()));
    app.run(&mut rig.peripherals()).unwrap();

    assert_eq!(rig.link.attempts, 0);
    assert!(rig.has(&AppEvent::ConnectAttemptFailed {
        attempt: 0,
        reason: ConnectivityError::InvalidPassword.to_string(),
    }));
    assert_eq!(visited(&rig), vec![StateId::Connecting, StateId::ConnectFailed, StateId::Done]);
}

// ── Unknown location ──────────────────────────────────────────

#[test]
fn empty_scan_shows_message_and_ends_even_with_repeat() {
    let root = tempfile::tempdir().unwrap();
    let mut rig = Rig::new(
        ScriptedScanner::always("wlan0     No scan results\n"),
        MapLocator::default(),
        ScriptedLink::online(),
    );
    let mut cfg = config(root.path());
    cfg.repeat = true;

    let mut app = orchestrator(cfg);
    app.run(&mut rig.peripherals()).unwrap();

    assert_eq!(
        visited(&rig),
        vec![
            StateId::Connecting,
            StateId::Resolving,
            StateId::UnknownLocation,
            StateId::Done,
        ]
    );
    assert!(rig.has(&AppEvent::NetworksScanned(0)));
    assert!(rig.has(&AppEvent::PresentationFinished {
        dir: None,
        executed: 0,
        skipped: 0,
        failed: 0,
    }));
    assert!(rig.locator.asked.is_empty());
    assert!(rig.clock.slept.contains(&Duration::from_secs(5)));
    assert!(rig.clock.slept.contains(&Duration::from_secs(8)));
}

#[test]
fn no_match_plays_a_non_empty_unknown_presentation() {
    let root = tempfile::tempdir().unwrap();
    location(root.path(), "office", &office_rule());
    let lost = unknown(root.path(), "lost", &json!(["display message Where am I?"]));
    unknown(root.path(), "empty", &json!([]));

    let mut rig = Rig::new(
        ScriptedScanner::always(SCAN),
        MapLocator::default().with(STRONG, Ok(Some(Coordinates::new(0.0, 0.0)))),
        ScriptedLink::online(),
    );
    let mut app = orchestrator(config(root.path()));
    app.run(&mut rig.peripherals()).unwrap();

    assert!(rig.has(&AppEvent::NoMatch));
    assert!(rig.has(&AppEvent::PresentationFinished {
        dir: Some(lost),
        executed: 1,
        skipped: 0,
        failed: 0,
    }));
    assert_eq!(
        visited(&rig),
        vec![
            StateId::Connecting,
            StateId::Resolving,
            StateId::Matching,
            StateId::UnknownLocation,
            StateId::Done,
        ]
    );
}

// ── Repeat ────────────────────────────────────────────────────

#[test]
fn repeat_loops_until_interrupted() {
    let root = tempfile::tempdir().unwrap();
    location(root.path(), "office", &office_rule());
    let mut rig = Rig::new(
        ScriptedScanner::always(SCAN),
        MapLocator::default().with(STRONG, Ok(Some(OFFICE))),
        ScriptedLink::online(),
    );
    // Sleeps: connect pause, first cooldown, second cooldown (interrupted).
    rig.clock = InstantClock::interrupt_on(3);
    let mut cfg = config(root.path());
    cfg.repeat = true;

    let mut app = orchestrator(cfg);
    let result = app.run(&mut rig.peripherals());

    assert!(result.is_err());
    assert_eq!(app.state(), StateId::Cooldown);
    assert_eq!(app.context().passes, 2);
    assert_eq!(rig.scanner.scans, 2);
    assert_eq!(rig.link.prepares, 1);
    assert_eq!(
        rig.clock.slept,
        vec![Duration::from_secs(1), Duration::from_secs(30), Duration::from_secs(30)]
    );
    assert!(!rig.has(&AppEvent::Finished));
}

#[test]
fn interrupt_during_lookup_skips_remaining_networks() {
    let root = tempfile::tempdir().unwrap();
    location(root.path(), "office", &office_rule());
    let mut rig = Rig::new(
        ScriptedScanner::always(SCAN),
        MapLocator::default().with(WEAK, Ok(Some(OFFICE))),
        ScriptedLink::online(),
    );
    rig.locator.interrupt = Some(rig.clock.interrupt_flag());

    let mut app = orchestrator(config(root.path()));
    let result = app.run(&mut rig.peripherals());

    assert!(result.is_err());
    assert_eq!(app.state(), StateId::Resolving);
    assert_eq!(rig.locator.asked, vec![STRONG.to_owned()]);
    assert!(!rig.has(&AppEvent::Resolved(OFFICE)));
    assert!(!rig.has(&AppEvent::Finished));
}
