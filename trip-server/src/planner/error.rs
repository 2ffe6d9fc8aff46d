//! Planner error taxonomy.

use crate::domain::TripId;
use crate::geocode::GeocodeError;
use crate::rides::RideError;
use crate::store::StoreError;

/// Errors from planning or advancing a trip.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Request was malformed or incomplete
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced location or trip does not exist
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    /// Every leg of the trip has already been requested
    #[error("trip {trip} has no legs left to request ({legs} legs in route)")]
    OutOfRange { trip: TripId, legs: usize },

    /// Geocoder or ride provider failed, timed out, or answered nothing usable
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Another request advanced the same trip first
    #[error("trip {0} was advanced by a concurrent request")]
    Conflict(TripId),

    /// Persistence failed
    #[error("storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for PlanError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { collection, id } => PlanError::NotFound {
                kind: collection,
                id,
            },
            StoreError::Conflict { id, .. } => PlanError::Conflict(TripId::new(id)),
            other => PlanError::Storage(other),
        }
    }
}

impl From<RideError> for PlanError {
    fn from(e: RideError) -> Self {
        PlanError::Upstream(format!("ride provider: {e}"))
    }
}

impl From<GeocodeError> for PlanError {
    fn from(e: GeocodeError) -> Self {
        PlanError::Upstream(format!("geocoder: {e}"))
    }
}
