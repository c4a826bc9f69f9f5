//! Mock peripherals for integration tests.
//!
//! Every mock records what it was asked to do so tests can assert on the
//! full call history without a panel, radio or hotspot.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use placecard::app::events::AppEvent;
use placecard::app::ports::{
    ConnectivityPort, DisplayPort, EventSink, LocatorPort, ScannerPort, TimePort,
};
use placecard::app::service::Peripherals;
use placecard::error::{ConnectivityError, DisplayError, Interrupted, LookupError, ScanError};
use placecard::location::Coordinates;
use placecard::render::Bitmap;

// ── Display ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PanelCall {
    Init,
    Clear(u8),
    Full { black: usize },
    Partial { black: usize },
    PowerDown,
}

#[derive(Default)]
pub struct MockPanel {
    pub calls: Vec<PanelCall>,
    pub frames: Vec<Bitmap>,
    /// Every render call fails with `Busy`.
    pub broken: bool,
}

#[allow(dead_code)]
impl MockPanel {
    pub fn renders(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PanelCall::Full { .. } | PanelCall::Partial { .. }))
            .count()
    }

    pub fn clears(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, PanelCall::Clear(_))).count()
    }
}

impl DisplayPort for MockPanel {
    fn init(&mut self) -> Result<(), DisplayError> {
        self.calls.push(PanelCall::Init);
        Ok(())
    }

    fn clear(&mut self, fill: u8) -> Result<(), DisplayError> {
        self.calls.push(PanelCall::Clear(fill));
        Ok(())
    }

    fn render_full(&mut self, frame: &Bitmap) -> Result<(), DisplayError> {
        if self.broken {
            return Err(DisplayError::Busy);
        }
        self.calls.push(PanelCall::Full { black: frame.count_black() });
        self.frames.push(frame.clone());
        Ok(())
    }

    fn render_partial(&mut self, frame: &Bitmap) -> Result<(), DisplayError> {
        if self.broken {
            return Err(DisplayError::Busy);
        }
        self.calls.push(PanelCall::Partial { black: frame.count_black() });
        self.frames.push(frame.clone());
        Ok(())
    }

    fn power_down(&mut self) -> Result<(), DisplayError> {
        self.calls.push(PanelCall::PowerDown);
        Ok(())
    }
}

// ── Scanner ───────────────────────────────────────────────────

/// Replays scripted scan results; the last one repeats forever.
#[derive(Default)]
pub struct ScriptedScanner {
    script: VecDeque<Result<String, ScanError>>,
    last: Option<Result<String, ScanError>>,
    pub scans: usize,
}

#[allow(dead_code)]
impl ScriptedScanner {
    pub fn always(output: &str) -> Self {
        Self::new(vec![Ok(output.to_owned())])
    }

    pub fn new(script: Vec<Result<String, ScanError>>) -> Self {
        Self { script: script.into(), last: None, scans: 0 }
    }
}

impl ScannerPort for ScriptedScanner {
    fn scan(&mut self) -> Result<String, ScanError> {
        self.scans += 1;
        if let Some(next) = self.script.pop_front() {
            self.last = Some(next);
        }
        self.last.clone().unwrap_or_else(|| Ok(String::new()))
    }
}

// ── Locator ───────────────────────────────────────────────────

/// Fixed BSSID → answer table.  Unlisted BSSIDs are unknown.
#[derive(Default)]
pub struct MapLocator {
    pub known: HashMap<String, Result<Option<Coordinates>, LookupError>>,
    pub asked: Vec<String>,
    /// Raised after every answer, like Ctrl-C during a lookup.
    pub interrupt: Option<Rc<Cell<bool>>>,
}

#[allow(dead_code)]
impl MapLocator {
    pub fn with(mut self, bssid: &str, answer: Result<Option<Coordinates>, LookupError>) -> Self {
        self.known.insert(bssid.to_owned(), answer);
        self
    }
}

impl LocatorPort for MapLocator {
    fn locate(&mut self, bssid: &str) -> Result<Option<Coordinates>, LookupError> {
        self.asked.push(bssid.to_owned());
        if let Some(flag) = &self.interrupt {
            flag.set(true);
        }
        self.known.get(bssid).cloned().unwrap_or(Ok(None))
    }
}

// ── Hotspot link ──────────────────────────────────────────────

/// Fails `failures` attempts, then connects (`None` = never connects).
pub struct ScriptedLink {
    pub prepare_result: Result<(), ConnectivityError>,
    pub failures: Option<u32>,
    pub prepares: u32,
    pub attempts: u32,
}

#[allow(dead_code)]
impl ScriptedLink {
    pub fn online() -> Self {
        Self::after(0)
    }

    pub fn after(failures: u32) -> Self {
        Self { prepare_result: Ok(()), failures: Some(failures), prepares: 0, attempts: 0 }
    }

    pub fn never() -> Self {
        Self { prepare_result: Ok(()), failures: None, prepares: 0, attempts: 0 }
    }
}

impl ConnectivityPort for ScriptedLink {
    fn prepare(&mut self) -> Result<(), ConnectivityError> {
        self.prepares += 1;
        self.prepare_result.clone()
    }

    fn try_connect(&mut self) -> Result<(), ConnectivityError> {
        self.attempts += 1;
        match self.failures {
            Some(n) if self.attempts > n => Ok(()),
            _ => Err(ConnectivityError::NoInternet),
        }
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Records sleeps without waiting.  Optionally raises the interrupt on
/// the N-th sleep (1-based).
#[derive(Default)]
pub struct InstantClock {
    pub slept: Vec<Duration>,
    pub interrupt_on: Option<usize>,
    tripped: Rc<Cell<bool>>,
}

#[allow(dead_code)]
impl InstantClock {
    pub fn interrupt_on(n: usize) -> Self {
        Self { interrupt_on: Some(n), ..Self::default() }
    }

    pub fn total(&self) -> Duration {
        self.slept.iter().sum()
    }

    /// Shared interrupt flag, for raising it from another mock.
    pub fn interrupt_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.tripped)
    }
}

impl TimePort for InstantClock {
    fn sleep(&mut self, duration: Duration) -> Result<(), Interrupted> {
        if self.tripped.get() {
            return Err(Interrupted);
        }
        self.slept.push(duration);
        if self.interrupt_on == Some(self.slept.len()) {
            self.tripped.set(true);
            return Err(Interrupted);
        }
        Ok(())
    }

    fn interrupted(&self) -> bool {
        self.tripped.get()
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct EventLog {
    pub events: Vec<AppEvent>,
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// One of every mock, lent out as [`Peripherals`].
pub struct Rig {
    pub panel: MockPanel,
    pub scanner: ScriptedScanner,
    pub locator: MapLocator,
    pub link: ScriptedLink,
    pub clock: InstantClock,
    pub log: EventLog,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(scanner: ScriptedScanner, locator: MapLocator, link: ScriptedLink) -> Self {
        Self {
            panel: MockPanel::default(),
            scanner,
            locator,
            link,
            clock: InstantClock::default(),
            log: EventLog::default(),
        }
    }

    pub fn peripherals(&mut self) -> Peripherals<'_> {
        Peripherals {
            display: &mut self.panel,
            scanner: &mut self.scanner,
            locator: &mut self.locator,
            link: &mut self.link,
            clock: &mut self.clock,
            events: &mut self.log,
        }
    }

    pub fn has(&self, event: &AppEvent) -> bool {
        self.log.events.contains(event)
    }
}
