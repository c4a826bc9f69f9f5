//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the outcome of the last hotspot attempt, the scan and
//! resolution of the current pass, the selected presentation, and the
//! configuration.  Think of it as the "blackboard" in a blackboard
//! architecture.  The orchestrator writes results in; handlers turn them
//! into transitions.

use crate::config::SystemConfig;
use crate::geofence::Presentation;
use crate::location::ResolutionResult;

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,

    // -- Hotspot --
    /// Existing connections on the interface were brought down.
    pub link_prepared: bool,
    /// Failed association attempts so far.
    pub connect_failures: u32,
    /// The hotspot is up and online.
    pub connected: bool,

    // -- Current pass --
    /// Resolve/present passes started (1-based once resolving begins).
    pub passes: u32,
    /// The scan of this pass found nothing.
    pub no_networks: bool,
    pub resolution: Option<ResolutionResult>,
    /// Presentation chosen by the matcher for this pass.
    pub selection: Option<Presentation>,

    // -- Configuration --
    pub config: SystemConfig,
}

impl FsmContext {
    /// Create a new context with the given configuration.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            link_prepared: false,
            connect_failures: 0,
            connected: false,
            passes: 0,
            no_networks: false,
            resolution: None,
            selection: None,
            config,
        }
    }

    /// Every association attempt has failed.
    pub fn connect_exhausted(&self) -> bool {
        !self.connected && self.connect_failures >= self.config.connect_attempts
    }

    /// Forget everything learned in the previous pass.
    pub fn reset_pass(&mut self) {
        self.no_networks = false;
        self.resolution = None;
        self.selection = None;
    }
}
