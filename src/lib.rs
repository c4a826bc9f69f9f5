//! Placecard library.
//!
//! Exposes the pure-logic modules (scan parsing, geolocation, geofence
//! matching, action scripts, the FSM and the orchestrator) together with
//! the host adapters, for both binaries and the integration tests.

#![deny(unused_must_use)]

pub mod actions;
pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod geofence;
pub mod location;
pub mod render;
