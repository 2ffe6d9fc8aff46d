//! Trip planning and trip progression.
//!
//! `RoutePlanner` turns a starting location and a set of destinations into
//! a stored trip: one price estimate per destination, measured from the
//! start, with the destinations ordered by leg distance. `TripProgressor`
//! walks a stored trip one leg at a time, requesting a ride for each leg.

mod config;
mod error;
mod progress;
mod route;
mod select;
#[cfg(test)]
pub(crate) mod test_support;

pub use config::PlannerConfig;
pub use error::PlanError;
pub use progress::{ProgressSequence, ProgressSnapshot, TripProgressor};
pub use route::{RoutePlanner, RouteTotals, best_route};
pub use select::{Cheapest, Fastest, FirstAvailable, SelectionPolicy, UnknownPolicy, policy_by_name};
