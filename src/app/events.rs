//! Outbound application events.
//!
//! The [`Orchestrator`](super::service::Orchestrator) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them.

use std::path::PathBuf;

use crate::fsm::StateId;
use crate::location::Coordinates;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The orchestrator has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// One hotspot association attempt failed.
    ConnectAttemptFailed { attempt: u32, reason: String },

    /// The hotspot is up and the internet is reachable.
    Connected { attempts: u32 },

    /// A scan finished.
    NetworksScanned(usize),

    /// The resolver found coordinates.
    Resolved(Coordinates),

    /// Every candidate was tried without success.
    Unresolved { attempted: usize },

    /// A catalogue entry was rejected while loading.
    CatalogueEntryRejected { dir: PathBuf, reason: String },

    /// A geofenced rule was selected.
    Matched { dir: PathBuf },

    /// No geofenced rule matched.
    NoMatch,

    /// A presentation finished.  `dir` is `None` for the built-in
    /// "unknown location" message.
    PresentationFinished { dir: Option<PathBuf>, executed: usize, skipped: usize, failed: usize },

    /// The routine ended.
    Finished,
}
