//! Application core — domain orchestration, zero direct I/O.
//!
//! The connect → resolve → match → present routine lives here.  All
//! interaction with the panel, radio and network happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
