//! Trip progression: request a ride for the next leg of a stored trip.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{LegRequest, LocationId, ProgressId, TripId, TripStatus};
use crate::rides::RideProvider;
use crate::store::{LocationStore, StoreError, TripStore};

use super::config::PlannerConfig;
use super::error::PlanError;
use super::select::SelectionPolicy;

/// Source of progress snapshot ids. Starts at 1.
#[derive(Debug)]
pub struct ProgressSequence(AtomicU64);

impl Default for ProgressSequence {
    fn default() -> Self {
        Self(AtomicU64::new(1))
    }
}

impl ProgressSequence {
    pub fn next(&self) -> ProgressId {
        ProgressId::new(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

/// Result of requesting one leg of a trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub id: ProgressId,
    pub trip_id: TripId,
    pub starting_from_location_id: LocationId,
    /// Origin of the leg just requested.
    pub current_location_id: LocationId,
    pub next_destination_location_id: LocationId,
    pub best_route_location_ids: Vec<LocationId>,
    pub total_distance: f64,
    pub total_uber_costs: i64,
    pub total_uber_duration: i64,
    /// Always `requesting`: the snapshot describes a ride in flight.
    pub status: TripStatus,
    /// Driver ETA in minutes.
    pub uber_wait_time_eta: Option<i64>,
    pub request_id: String,
}

/// Walks a stored trip one leg per call.
pub struct TripProgressor<'a, P> {
    provider: &'a P,
    locations: &'a LocationStore,
    trips: &'a TripStore,
    policy: &'a dyn SelectionPolicy,
    config: &'a PlannerConfig,
    sequence: &'a ProgressSequence,
}

impl<'a, P: RideProvider> TripProgressor<'a, P> {
    pub fn new(
        provider: &'a P,
        locations: &'a LocationStore,
        trips: &'a TripStore,
        policy: &'a dyn SelectionPolicy,
        config: &'a PlannerConfig,
        sequence: &'a ProgressSequence,
    ) -> Self {
        Self {
            provider,
            locations,
            trips,
            policy,
            config,
            sequence,
        }
    }

    /// Request a ride for the trip's next leg and advance its cursor.
    ///
    /// The leg is claimed before the ride is booked, so only one request
    /// per leg reaches the provider. The cursor only moves once the ride
    /// has been booked and recorded; any earlier failure leaves the trip
    /// as it was.
    pub async fn advance(&self, trip_id: TripId) -> Result<ProgressSnapshot, PlanError> {
        let trip = self.trips.get(trip_id).await?;
        let leg = trip.next_leg;

        let (origin_id, destination_id) =
            trip.leg_endpoints(leg).ok_or(PlanError::OutOfRange {
                trip: trip_id,
                legs: trip.leg_count(),
            })?;

        let origin = self.locations.get(origin_id).await?;
        let destination = self.locations.get(destination_id).await?;

        let products = self
            .config
            .upstream
            .call("products", || self.provider.products(destination.coordinate))
            .await?;
        let product = self.policy.select_product(&products).ok_or_else(|| {
            PlanError::Upstream(format!(
                "no products available at location {destination_id}"
            ))
        })?;

        debug!(
            trip_id = %trip_id,
            leg,
            origin = %origin_id,
            destination = %destination_id,
            product = %product.product_id,
            "requesting ride"
        );

        // Held until the leg is recorded, so a concurrent advance is
        // refused before it books a second ride
        self.trips.claim_leg(trip_id, leg).await?;

        let receipt = match self
            .config
            .upstream
            .once(self.provider.request_ride(
                origin.coordinate,
                destination.coordinate,
                &product.product_id,
            ))
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                if let Err(release) = self.trips.release_leg(trip_id, leg).await {
                    warn!(trip_id = %trip_id, leg, error = %release, "failed to release leg claim");
                }
                return Err(e.into());
            }
        };

        let request = LegRequest {
            leg,
            request_id: receipt.request_id.clone(),
            product_id: product.product_id.clone(),
            eta: receipt.eta,
            requested_at: Utc::now(),
        };

        let trip = match self.trips.record_leg_request(trip_id, leg, request).await {
            Ok(trip) => trip,
            Err(e @ StoreError::Conflict { .. }) => {
                warn!(
                    trip_id = %trip_id,
                    leg,
                    request_id = %receipt.request_id,
                    "leg already advanced by another request, ride request left unrecorded"
                );
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            trip_id = %trip_id,
            leg,
            legs = trip.leg_count(),
            request_id = %receipt.request_id,
            status = %trip.status,
            "requested leg"
        );

        Ok(ProgressSnapshot {
            id: self.sequence.next(),
            trip_id,
            starting_from_location_id: trip.starting_from_location_id,
            current_location_id: origin_id,
            next_destination_location_id: destination_id,
            best_route_location_ids: trip.best_route_location_ids,
            total_distance: trip.total_distance,
            total_uber_costs: trip.total_uber_costs,
            total_uber_duration: trip.total_uber_duration,
            status: TripStatus::Requesting,
            uber_wait_time_eta: receipt.eta,
            request_id: receipt.request_id,
        })
    }
}
