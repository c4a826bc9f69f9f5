//! Strongest-signal-first BSSID geolocation.
//!
//! The resolver asks the locator about one access point at a time,
//! strongest first, and stops at the first one with known coordinates.
//! A lookup that fails or comes back unknown just moves on to the next
//! candidate; only running out of candidates ends the search empty-handed.

use log::{debug, info, warn};

use crate::app::ports::LocatorPort;
use crate::error::LookupError;

use super::geo::Coordinates;
use super::scan::NetworkObservation;

/// Outcome of one resolution cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Resolved(Coordinates),
    Unresolved,
}

impl Resolution {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Self::Resolved(c) => Some(*c),
            Self::Unresolved => None,
        }
    }
}

/// Resolution outcome plus everything the matcher needs afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    pub resolution: Resolution,
    /// The full scan, whatever the outcome.
    pub observations: Vec<NetworkObservation>,
    /// BSSIDs in the order they were looked up.
    pub attempted: Vec<String>,
}

/// Greedy resolver over a set of observations.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoResolver;

impl GeoResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve using a [`LocatorPort`].
    pub fn resolve(
        &self,
        observations: Vec<NetworkObservation>,
        locator: &mut (impl LocatorPort + ?Sized),
    ) -> ResolutionResult {
        self.resolve_with(observations, |bssid| locator.locate(bssid))
    }

    /// Resolve using an arbitrary lookup closure.  The closure is called
    /// once per attempted BSSID, in non-increasing signal order.
    /// [`LookupError::Cancelled`] stops the walk with `Unresolved`.
    pub fn resolve_with<F>(
        &self,
        observations: Vec<NetworkObservation>,
        mut lookup: F,
    ) -> ResolutionResult
    where
        F: FnMut(&str) -> Result<Option<Coordinates>, LookupError>,
    {
        let mut tried = vec![false; observations.len()];
        let mut attempted = Vec::with_capacity(observations.len());

        while let Some(idx) = strongest_untried(&observations, &tried) {
            tried[idx] = true;
            let bssid = &observations[idx].bssid;
            attempted.push(bssid.clone());

            match lookup(bssid) {
                Ok(Some(coords)) => {
                    info!(
                        "LOOKUP: {} ({} dBm) -> {:.5}, {:.5}",
                        bssid, observations[idx].signal_dbm, coords.latitude, coords.longitude
                    );
                    return ResolutionResult {
                        resolution: Resolution::Resolved(coords),
                        observations,
                        attempted,
                    };
                }
                Ok(None) => debug!("LOOKUP: {} unknown", bssid),
                Err(LookupError::Cancelled) => {
                    attempted.pop();
                    info!("LOOKUP: cancelled after {} attempt(s)", attempted.len());
                    break;
                }
                Err(e) => warn!("LOOKUP: {} failed: {}", bssid, e),
            }
        }

        info!(
            "LOOKUP: none of {} networks could be located",
            observations.len()
        );
        ResolutionResult {
            resolution: Resolution::Unresolved,
            observations,
            attempted,
        }
    }
}

/// Index of the untried observation with the highest signal.  Ties go
/// to the earliest one.
fn strongest_untried(observations: &[NetworkObservation], tried: &[bool]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, obs) in observations.iter().enumerate() {
        if tried[i] {
            continue;
        }
        match best {
            Some(b) if observations[b].signal_dbm >= obs.signal_dbm => {}
            _ => best = Some(i),
        }
    }
    best
}
