//! Application service — the hexagonal core.
//!
//! [`Orchestrator`] owns the FSM, the shared context, the engines and the
//! random source.  Each [`step`](Orchestrator::step) performs the current
//! state's I/O through the injected ports, writes the outcome into the
//! context, then ticks the FSM to pick the next state.
//!
//! ```text
//!  ScannerPort ──▶ ┌──────────────────────────────┐ ──▶ DisplayPort
//!  LocatorPort ──▶ │         Orchestrator          │ ──▶ EventSink
//! ConnectivityPort▶│ FSM · resolver · matcher ·    │
//!     TimePort ◀──▶│ interpreter · Rng             │
//!                  └──────────────────────────────┘
//! ```

use std::time::Duration;

use log::{info, warn};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::actions::{ActionInterpreter, Refresh, RunReport, clear_screen};
use crate::config::SystemConfig;
use crate::error::{ConnectivityError, Interrupted, LookupError};
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::geofence::{Catalogue, GeofenceMatcher, Presentation, pick_unknown};
use crate::location::{GeoResolver, Resolution, parse_scan};
use crate::render::Renderer;

use super::events::AppEvent;
use super::ports::{ConnectivityPort, DisplayPort, EventSink, LocatorPort, ScannerPort, TimePort};

/// Shown when no presentation at all is available.
pub const UNKNOWN_LOCATION_MESSAGE: &str = "unknown location";
/// Stands in for a MAC address until the first lookup starts.
pub const BSSID_PLACEHOLDER: &str = "  :  :  :  :  :  ";

const PREPARE_PAUSE: Duration = Duration::from_secs(1);
const CONNECT_FAILED_HOLD: Duration = Duration::from_secs(8);
const UNKNOWN_MESSAGE_HOLD: Duration = Duration::from_secs(5);
const NO_NETWORKS_HOLD: Duration = Duration::from_secs(8);

// ───────────────────────────────────────────────────────────────
// Peripherals
// ───────────────────────────────────────────────────────────────

/// Every port the orchestrator drives, borrowed for the run.
pub struct Peripherals<'a> {
    pub display: &'a mut dyn DisplayPort,
    pub scanner: &'a mut dyn ScannerPort,
    pub locator: &'a mut dyn LocatorPort,
    pub link: &'a mut dyn ConnectivityPort,
    pub clock: &'a mut dyn TimePort,
    pub events: &'a mut dyn EventSink,
}

// ───────────────────────────────────────────────────────────────
// Orchestrator
// ───────────────────────────────────────────────────────────────

/// Runs the connect → resolve → match → present routine.
pub struct Orchestrator<R: Rng> {
    fsm: Fsm,
    ctx: FsmContext,
    interpreter: ActionInterpreter,
    resolver: GeoResolver,
    matcher: GeofenceMatcher,
    rng: R,
    /// Face shown on the connecting screen; re-rolled every two failures.
    face: String,
}

impl<R: Rng> Orchestrator<R> {
    /// Construct the orchestrator.  Does **not** start the FSM; call
    /// [`run`](Self::run), or [`start`](Self::start) and then
    /// [`step`](Self::step).
    pub fn new(config: SystemConfig, rng: R) -> Self {
        let interpreter = ActionInterpreter::new(Renderer::from_config(&config));
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Idle),
            ctx: FsmContext::new(config),
            interpreter,
            resolver: GeoResolver::new(),
            matcher: GeofenceMatcher::new(),
            rng,
            face: String::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, hw: &mut Peripherals<'_>) {
        self.fsm.start(&mut self.ctx);
        hw.events.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("Orchestrator started in {:?}", self.fsm.current_state());
    }

    /// Run the routine to completion.  Returns early only on interrupt.
    pub fn run(&mut self, hw: &mut Peripherals<'_>) -> Result<(), Interrupted> {
        self.start(hw);
        while self.state() != StateId::Done {
            self.step(hw)?;
        }
        hw.events.emit(&AppEvent::Finished);
        Ok(())
    }

    /// Perform the current state's work, then tick the FSM.
    pub fn step(&mut self, hw: &mut Peripherals<'_>) -> Result<(), Interrupted> {
        let prev = self.fsm.current_state();

        match prev {
            StateId::Idle => self.clear(hw),
            StateId::Connecting => self.connect_attempt(hw)?,
            StateId::ConnectFailed => self.connect_failed(hw)?,
            StateId::Resolving => self.resolve(hw)?,
            StateId::Matching => self.match_catalogue(hw),
            StateId::Presenting => self.present(hw)?,
            StateId::UnknownLocation => self.unknown_location(hw)?,
            StateId::Cooldown => self.cooldown(hw)?,
            StateId::Done => {}
        }

        self.fsm.tick(&mut self.ctx);

        let next = self.fsm.current_state();
        if next != prev {
            hw.events.emit(&AppEvent::StateChanged { from: prev, to: next });
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Read-only view of the blackboard.
    pub fn context(&self) -> &FsmContext {
        &self.ctx
    }

    // ── Connecting ────────────────────────────────────────────

    fn connect_message(&self) -> String {
        format!(
            "Connecting to the hotspot\nSsid - {}\nPassword - {}",
            self.ctx.config.mobile_hotspot_ssid, self.ctx.config.mobile_hotspot_password
        )
    }

    fn connect_attempt(&mut self, hw: &mut Peripherals<'_>) -> Result<(), Interrupted> {
        let message = self.connect_message();

        if !self.ctx.link_prepared {
            self.face = pick(&mut self.rng, &self.ctx.config.looking_characters);
            self.show(hw, &format!("{message}\n\n{}", self.face), Refresh::Full);

            if let Err(e) = hw.link.prepare() {
                warn!("HOTSPOT: prepare failed: {}", e);
                if matches!(
                    e,
                    ConnectivityError::NoCredentials
                        | ConnectivityError::InvalidSsid
                        | ConnectivityError::InvalidPassword
                ) {
                    // Retrying cannot fix bad credentials.
                    self.ctx.connect_failures = self.ctx.config.connect_attempts;
                    hw.events.emit(&AppEvent::ConnectAttemptFailed {
                        attempt: 0,
                        reason: e.to_string(),
                    });
                    return Ok(());
                }
            }
            self.ctx.link_prepared = true;
            hw.clock.sleep(PREPARE_PAUSE)?;
        }

        match hw.link.try_connect() {
            Ok(()) => {
                let attempts = self.ctx.connect_failures + 1;
                self.ctx.connected = true;
                info!("HOTSPOT: online after {} attempt(s)", attempts);
                hw.events.emit(&AppEvent::Connected { attempts });

                let happy = pick(&mut self.rng, &self.ctx.config.happy_characters);
                self.show(hw, &format!("Connected!\n\n{happy}"), Refresh::Partial);
            }
            Err(e) => {
                self.ctx.connect_failures += 1;
                let attempt = self.ctx.connect_failures;
                warn!("HOTSPOT: attempt {} failed: {}", attempt, e);
                hw.events.emit(&AppEvent::ConnectAttemptFailed { attempt, reason: e.to_string() });

                if !self.ctx.connect_exhausted() {
                    if attempt % 2 == 0 {
                        self.face = pick(&mut self.rng, &self.ctx.config.looking_characters);
                    }
                    let text = format!("{message}\nAttempt {attempt}\n{}", self.face);
                    self.show(hw, &text, Refresh::Partial);
                }
            }
        }
        Ok(())
    }

    fn connect_failed(&mut self, hw: &mut Peripherals<'_>) -> Result<(), Interrupted> {
        let sad = pick(&mut self.rng, &self.ctx.config.sad_angry_characters);
        let text = format!(
            "Couldn't connect to the network\nSsid - {}\nPassword - {}\n\n{sad}",
            self.ctx.config.mobile_hotspot_ssid, self.ctx.config.mobile_hotspot_password
        );
        self.clear(hw);
        self.show(hw, &text, Refresh::Full);
        hw.clock.sleep(CONNECT_FAILED_HOLD)?;
        self.clear(hw);
        Ok(())
    }

    // ── Resolving ─────────────────────────────────────────────

    fn resolve(&mut self, hw: &mut Peripherals<'_>) -> Result<(), Interrupted> {
        let message = pick(&mut self.rng, &self.ctx.config.finding_location_message);
        let face = pick(&mut self.rng, &self.ctx.config.looking_characters);
        let display_bssids = self.ctx.config.display_bssids;

        let intro = if display_bssids {
            format!("{message}\n\n{BSSID_PLACEHOLDER}\n\n{face}")
        } else {
            format!("{message}\n\n{face}")
        };
        self.clear(hw);
        self.show(hw, &intro, Refresh::Full);

        let raw = hw.scanner.scan().unwrap_or_else(|e| {
            warn!("SCAN: {}", e);
            String::new()
        });
        let observations = parse_scan(&raw);
        hw.events.emit(&AppEvent::NetworksScanned(observations.len()));
        if observations.is_empty() {
            info!("SCAN: no networks found");
            self.ctx.no_networks = true;
            return Ok(());
        }

        let rng = &mut self.rng;
        let looking = &self.ctx.config.looking_characters;
        let interpreter = &self.interpreter;
        let display = &mut *hw.display;
        let locator = &mut *hw.locator;
        let clock = &*hw.clock;

        let result = self.resolver.resolve_with(observations, |bssid| {
            if clock.interrupted() {
                return Err(LookupError::Cancelled);
            }
            let face = pick(&mut *rng, looking);
            let text = if display_bssids {
                format!("{message}\n\n{bssid}\n\n{face}")
            } else {
                format!("{message}\n\n{face}")
            };
            if let Err(e) = interpreter.show_text(&mut *display, &text, false, Refresh::Partial) {
                warn!("DISPLAY: {}", e);
            }
            locator.locate(bssid)
        });

        if hw.clock.interrupted() {
            return Err(Interrupted);
        }

        match result.resolution {
            Resolution::Resolved(coords) => hw.events.emit(&AppEvent::Resolved(coords)),
            Resolution::Unresolved => hw.events.emit(&AppEvent::Unresolved {
                attempted: result.attempted.len(),
            }),
        }
        self.ctx.resolution = Some(result);
        Ok(())
    }

    // ── Matching ──────────────────────────────────────────────

    fn match_catalogue(&mut self, hw: &mut Peripherals<'_>) {
        let catalogue = Catalogue::load(&self.ctx.config.locations_path());
        for (dir, e) in &catalogue.rejected {
            hw.events.emit(&AppEvent::CatalogueEntryRejected {
                dir: dir.clone(),
                reason: e.to_string(),
            });
        }

        let Some(result) = self.ctx.resolution.as_ref() else {
            return;
        };
        let selection = self
            .matcher
            .select(&catalogue.rules, &result.observations, &result.resolution, &mut self.rng)
            .map(Presentation::from);

        match &selection {
            Some(p) => hw.events.emit(&AppEvent::Matched { dir: p.directory.clone() }),
            None => hw.events.emit(&AppEvent::NoMatch),
        }
        self.ctx.selection = selection;
    }

    // ── Presenting ────────────────────────────────────────────

    fn present(&mut self, hw: &mut Peripherals<'_>) -> Result<(), Interrupted> {
        let Some(presentation) = self.ctx.selection.clone() else {
            return Ok(());
        };
        self.clear(hw);
        let report = self.play(hw, &presentation)?;
        emit_finished(hw, Some(&presentation), report);
        Ok(())
    }

    fn unknown_location(&mut self, hw: &mut Peripherals<'_>) -> Result<(), Interrupted> {
        let no_networks = self.ctx.no_networks;
        if !no_networks {
            self.clear(hw);
        }

        match pick_unknown(&self.ctx.config.unknown_location_path(), &mut self.rng) {
            Some(presentation) => {
                info!("UNKNOWN: playing {}", presentation.directory.display());
                let report = self.play(hw, &presentation)?;
                emit_finished(hw, Some(&presentation), report);
            }
            None => {
                info!("UNKNOWN: no fallback presentation, showing message");
                self.show(hw, UNKNOWN_LOCATION_MESSAGE, Refresh::Full);
                hw.clock.sleep(UNKNOWN_MESSAGE_HOLD)?;
                self.clear(hw);
                emit_finished(hw, None, RunReport::default());
            }
        }

        if no_networks {
            hw.clock.sleep(NO_NETWORKS_HOLD)?;
        }
        Ok(())
    }

    fn play(
        &self,
        hw: &mut Peripherals<'_>,
        presentation: &Presentation,
    ) -> Result<RunReport, Interrupted> {
        self.interpreter.run(
            &presentation.actions,
            &presentation.directory,
            &mut *hw.display,
            &mut *hw.clock,
        )
    }

    // ── Cooldown ──────────────────────────────────────────────

    fn cooldown(&mut self, hw: &mut Peripherals<'_>) -> Result<(), Interrupted> {
        let cooldown = self.ctx.config.cooldown();
        info!("COOLDOWN: {:?} before next pass", cooldown);
        hw.clock.sleep(cooldown)?;
        self.clear(hw);
        Ok(())
    }

    // ── Display helpers ───────────────────────────────────────

    /// Progress screens are best-effort; failures are logged only.
    fn show(&self, hw: &mut Peripherals<'_>, text: &str, refresh: Refresh) {
        if let Err(e) = self.interpreter.show_text(&mut *hw.display, text, false, refresh) {
            warn!("DISPLAY: {}", e);
        }
    }

    fn clear(&self, hw: &mut Peripherals<'_>) {
        if let Err(e) = clear_screen(&mut *hw.display) {
            warn!("DISPLAY: clear failed: {}", e);
        }
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, choices: &[String]) -> String {
    choices.choose(rng).cloned().unwrap_or_default()
}

fn emit_finished(hw: &mut Peripherals<'_>, presentation: Option<&Presentation>, report: RunReport) {
    hw.events.emit(&AppEvent::PresentationFinished {
        dir: presentation.map(|p| p.directory.clone()),
        executed: report.executed,
        skipped: report.skipped,
        failed: report.failed,
    });
}
