//! Location resolution: raw scan text → observations → coordinates.
//!
//! ```text
//!  iwlist text ──▶ scan::parse_scan ──▶ [NetworkObservation]
//!                                            │
//!                 LocatorPort ◀── resolver::GeoResolver
//!                                            │
//!                                            ▼
//!                                    ResolutionResult
//! ```

pub mod geo;
pub mod resolver;
pub mod scan;

pub use geo::{Coordinates, haversine_km};
pub use resolver::{GeoResolver, Resolution, ResolutionResult};
pub use scan::{NetworkObservation, parse_scan};
