//! Domain types for the trip planner.
//!
//! Locations are geocoded once when created; trips are an ordered route over
//! stored locations plus the per-trip progression state used when requesting
//! rides leg by leg.

mod estimate;
mod ids;
mod location;
mod trip;

pub use estimate::LegEstimate;
pub use ids::{InvalidId, LocationId, ProgressId, TripId};
pub use location::{Address, Coordinate, Location};
pub use trip::{LegRequest, Trip, TripStatus};
