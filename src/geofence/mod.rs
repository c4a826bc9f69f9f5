//! Location catalogue and geofence matching.

pub mod catalogue;
pub mod matcher;

pub use catalogue::{Catalogue, LocationRule, Presentation, pick_unknown};
pub use matcher::{GeofenceMatcher, is_eligible};
