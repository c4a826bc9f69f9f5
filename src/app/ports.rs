//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Orchestrator (domain)
//! ```
//!
//! Driven adapters (panel, radio scanner, BSSID locator, hotspot link,
//! clock, event sinks) implement these traits.  The
//! [`Orchestrator`](super::service::Orchestrator) and the
//! [`ActionInterpreter`](crate::actions::ActionInterpreter) consume them,
//! so the domain core never shells out or touches hardware directly.
//!
//! Every port returns typed errors; callers inspect each result and
//! decide whether to skip, retry or fall back.

use std::time::Duration;

use crate::error::{ConnectivityError, DisplayError, Interrupted, LookupError, ScanError};
use crate::location::Coordinates;
use crate::render::Bitmap;

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → e-paper panel)
// ───────────────────────────────────────────────────────────────

/// The bitonal panel.  Exclusively owned by the orchestrator's thread.
pub trait DisplayPort {
    /// Wake / re-initialise the controller.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Fill the whole panel with `fill` (`0xFF` = white).
    fn clear(&mut self, fill: u8) -> Result<(), DisplayError>;

    /// Full refresh with `frame`.
    fn render_full(&mut self, frame: &Bitmap) -> Result<(), DisplayError>;

    /// Fast partial refresh with `frame`.
    fn render_partial(&mut self, frame: &Bitmap) -> Result<(), DisplayError>;

    /// Put the controller into deep sleep and release it.
    fn power_down(&mut self) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// Scanner port (driven adapter: radio → domain)
// ───────────────────────────────────────────────────────────────

/// Produces raw scan text for [`parse_scan`](crate::location::parse_scan).
pub trait ScannerPort {
    fn scan(&mut self) -> Result<String, ScanError>;
}

// ───────────────────────────────────────────────────────────────
// Locator port (driven adapter: domain → BSSID lookup service)
// ───────────────────────────────────────────────────────────────

/// Opaque synchronous BSSID → coordinates lookup.
///
/// `Ok(None)` means the service answered but does not know the BSSID.
/// `Err(_)` is a transient failure; the resolver treats both the same.
pub trait LocatorPort {
    fn locate(&mut self, bssid: &str) -> Result<Option<Coordinates>, LookupError>;
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: domain → hotspot link)
// ───────────────────────────────────────────────────────────────

/// Bring-up of the uplink the locator needs.
pub trait ConnectivityPort {
    /// One-off preparation before the first attempt (drop stale links).
    fn prepare(&mut self) -> Result<(), ConnectivityError>;

    /// A single association attempt, including the reachability probe.
    fn try_connect(&mut self) -> Result<(), ConnectivityError>;
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Blocking sleeps on the calling thread.
pub trait TimePort {
    /// Sleep for `duration`, or return early with [`Interrupted`] once the
    /// process has been asked to stop.
    fn sleep(&mut self, duration: Duration) -> Result<(), Interrupted>;

    /// Whether an interrupt is pending.
    fn interrupted(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
