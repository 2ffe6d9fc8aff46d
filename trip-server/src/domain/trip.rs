//! Planned trips and their progression state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LocationId, TripId};

/// Lifecycle status of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    /// Route planned, no ride requested yet.
    #[serde(rename = "Planning", alias = "planning")]
    Planning,
    /// At least one leg requested, more remain.
    Requesting,
    /// Every leg has been requested.
    Completed,
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TripStatus::Planning => "Planning",
            TripStatus::Requesting => "requesting",
            TripStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// A ride requested for one leg of a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegRequest {
    /// Index of the leg within the route.
    pub leg: usize,
    pub request_id: String,
    pub product_id: String,
    /// Driver ETA in minutes, when the provider reported one.
    pub eta: Option<i64>,
    pub requested_at: DateTime<Utc>,
}

/// A planned multi-stop trip.
///
/// `best_route_location_ids` is fixed at planning time. `next_leg` is the
/// per-trip cursor: the index of the next leg to request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub starting_from_location_id: LocationId,
    pub best_route_location_ids: Vec<LocationId>,
    pub status: TripStatus,
    /// Sum of leg distances in miles.
    pub total_distance: f64,
    /// Sum of the chosen low estimates.
    pub total_uber_costs: i64,
    /// Sum of leg durations in seconds.
    pub total_uber_duration: i64,
    #[serde(default)]
    pub next_leg: usize,
    #[serde(default)]
    pub leg_requests: Vec<LegRequest>,
    pub created_at: DateTime<Utc>,
    /// Leg whose ride is being booked right now. Process-local, so a
    /// restart releases it.
    #[serde(skip)]
    pub pending_leg: Option<usize>,
}

impl Trip {
    /// Number of legs in the route.
    pub fn leg_count(&self) -> usize {
        self.best_route_location_ids.len()
    }

    /// Whether every leg has been requested.
    pub fn is_complete(&self) -> bool {
        self.next_leg >= self.leg_count()
    }

    /// Origin and destination of leg `index`.
    ///
    /// Leg 0 starts at the trip's starting location; leg k starts at the
    /// destination of leg k-1.
    pub fn leg_endpoints(&self, index: usize) -> Option<(LocationId, LocationId)> {
        let destination = *self.best_route_location_ids.get(index)?;
        let origin = match index {
            0 => self.starting_from_location_id,
            k => self.best_route_location_ids[k - 1],
        };
        Some((origin, destination))
    }

    /// Record a requested ride for the current leg and move the cursor on.
    pub fn record_leg_request(&mut self, request: LegRequest) {
        self.leg_requests.push(request);
        self.next_leg += 1;
        self.pending_leg = None;
        self.status = if self.is_complete() {
            TripStatus::Completed
        } else {
            TripStatus::Requesting
        };
    }
}
