//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch.  Handlers only look at what the orchestrator wrote into the
//! context during the state's I/O step.
//!
//! ```text
//!  IDLE ──▶ CONNECTING ──[exhausted]──▶ CONNECT_FAILED ──▶ DONE
//!               │
//!          [connected]
//!               ▼
//!  ┌──────▶ RESOLVING ──[no networks]──────────────┐
//!  │            │                                   ▼
//!  │       [resolved]                        UNKNOWN_LOCATION ──▶ DONE
//!  │            ▼                                   ▲     │      (no networks
//!  │        MATCHING ──────────[no match]───────────┘     │       or no repeat)
//!  │            │                                         │
//!  │       [selected]                                     │
//!  │            ▼                                         │
//!  │       PRESENTING ──[no repeat]──▶ DONE               │
//!  │            │                                         │
//!  │        [repeat]                                [repeat]
//!  │            ▼                                         │
//!  └──────── COOLDOWN ◀───────────────────────────────────┘
//! ```

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Connecting
        StateDescriptor {
            id: StateId::Connecting,
            name: "Connecting",
            on_enter: Some(connecting_enter),
            on_exit: None,
            on_update: connecting_update,
        },
        // Index 2: ConnectFailed
        StateDescriptor {
            id: StateId::ConnectFailed,
            name: "ConnectFailed",
            on_enter: None,
            on_exit: None,
            on_update: connect_failed_update,
        },
        // Index 3: Resolving
        StateDescriptor {
            id: StateId::Resolving,
            name: "Resolving",
            on_enter: Some(resolving_enter),
            on_exit: None,
            on_update: resolving_update,
        },
        // Index 4: Matching
        StateDescriptor {
            id: StateId::Matching,
            name: "Matching",
            on_enter: None,
            on_exit: None,
            on_update: matching_update,
        },
        // Index 5: Presenting
        StateDescriptor {
            id: StateId::Presenting,
            name: "Presenting",
            on_enter: None,
            on_exit: Some(presentation_exit),
            on_update: presenting_update,
        },
        // Index 6: UnknownLocation
        StateDescriptor {
            id: StateId::UnknownLocation,
            name: "UnknownLocation",
            on_enter: None,
            on_exit: Some(presentation_exit),
            on_update: unknown_location_update,
        },
        // Index 7: Cooldown
        StateDescriptor {
            id: StateId::Cooldown,
            name: "Cooldown",
            on_enter: None,
            on_exit: None,
            on_update: cooldown_update,
        },
        // Index 8: Done
        StateDescriptor {
            id: StateId::Done,
            name: "Done",
            on_enter: Some(done_enter),
            on_exit: None,
            on_update: done_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.passes = 0;
    ctx.reset_pass();
    info!("IDLE: routine starting");
}

fn idle_update(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::Connecting)
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONNECTING state: bounded hotspot association retries
// ═══════════════════════════════════════════════════════════════════════════

fn connecting_enter(ctx: &mut FsmContext) {
    ctx.link_prepared = false;
    ctx.connect_failures = 0;
    ctx.connected = false;
    info!(
        "CONNECTING: up to {} attempts on {:?}",
        ctx.config.connect_attempts, ctx.config.mobile_hotspot_ssid
    );
}

fn connecting_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.connected {
        return Some(StateId::Resolving);
    }
    if ctx.connect_exhausted() {
        warn!(
            "CONNECTING: giving up after {} attempts ({} ticks)",
            ctx.connect_failures, ctx.ticks_in_state
        );
        return Some(StateId::ConnectFailed);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONNECT_FAILED state: failure screen already shown
// ═══════════════════════════════════════════════════════════════════════════

fn connect_failed_update(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::Done)
}

// ═══════════════════════════════════════════════════════════════════════════
//  RESOLVING state: scan and locate
// ═══════════════════════════════════════════════════════════════════════════

fn resolving_enter(ctx: &mut FsmContext) {
    ctx.reset_pass();
    ctx.passes += 1;
    debug!("RESOLVING: pass {}", ctx.passes);
}

fn resolving_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.no_networks {
        return Some(StateId::UnknownLocation);
    }
    ctx.resolution.as_ref().map(|_| StateId::Matching)
}

// ═══════════════════════════════════════════════════════════════════════════
//  MATCHING state
// ═══════════════════════════════════════════════════════════════════════════

fn matching_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.selection.is_some() {
        Some(StateId::Presenting)
    } else {
        Some(StateId::UnknownLocation)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  PRESENTING / UNKNOWN_LOCATION states
// ═══════════════════════════════════════════════════════════════════════════

fn presentation_exit(ctx: &mut FsmContext) {
    ctx.selection = None;
}

fn presenting_update(ctx: &mut FsmContext) -> Option<StateId> {
    Some(after_pass(ctx))
}

fn unknown_location_update(ctx: &mut FsmContext) -> Option<StateId> {
    // An empty scan ends the routine even when repeating.
    if ctx.no_networks {
        return Some(StateId::Done);
    }
    Some(after_pass(ctx))
}

fn after_pass(ctx: &FsmContext) -> StateId {
    if ctx.config.repeat {
        StateId::Cooldown
    } else {
        StateId::Done
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  COOLDOWN state
// ═══════════════════════════════════════════════════════════════════════════

fn cooldown_update(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::Resolving)
}

// ═══════════════════════════════════════════════════════════════════════════
//  DONE state: terminal
// ═══════════════════════════════════════════════════════════════════════════

fn done_enter(ctx: &mut FsmContext) {
    info!(
        "DONE: routine finished after {} pass(es), {} ticks",
        ctx.passes, ctx.total_ticks
    );
}

fn done_update(_ctx: &mut FsmContext) -> Option<StateId> {
    None
}
