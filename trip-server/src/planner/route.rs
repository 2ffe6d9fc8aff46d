//! Route planning.

use chrono::Utc;
use futures::future::try_join_all;
use tracing::{debug, info, warn};

use crate::domain::{LegEstimate, Location, LocationId, Trip, TripStatus};
use crate::rides::RideProvider;
use crate::store::{LocationStore, TripStore};

use super::config::PlannerConfig;
use super::error::PlanError;
use super::select::SelectionPolicy;

/// Sums over every estimated leg.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RouteTotals {
    /// Miles.
    pub distance: f64,
    /// Currency units.
    pub cost: i64,
    /// Seconds.
    pub duration: i64,
}

impl RouteTotals {
    /// Add up the legs. Independent of leg order.
    pub fn from_legs(legs: &[LegEstimate]) -> Self {
        legs.iter().fold(Self::default(), |acc, leg| Self {
            distance: acc.distance + leg.distance,
            cost: acc.cost + leg.low_estimate,
            duration: acc.duration + leg.duration,
        })
    }
}

/// Order destinations by ascending leg distance.
///
/// Stable: legs with equal distance keep their input order, and every leg
/// appears exactly once in the result, duplicates included.
pub fn best_route(legs: &[LegEstimate]) -> Vec<LocationId> {
    let mut ordered: Vec<&LegEstimate> = legs.iter().collect();
    ordered.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ordered.into_iter().map(|leg| leg.destination).collect()
}

/// Plans trips from a starting location over a set of destinations.
pub struct RoutePlanner<'a, P> {
    provider: &'a P,
    locations: &'a LocationStore,
    trips: &'a TripStore,
    policy: &'a dyn SelectionPolicy,
    config: &'a PlannerConfig,
}

impl<'a, P: RideProvider> RoutePlanner<'a, P> {
    /// Create a new planner.
    pub fn new(
        provider: &'a P,
        locations: &'a LocationStore,
        trips: &'a TripStore,
        policy: &'a dyn SelectionPolicy,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            provider,
            locations,
            trips,
            policy,
            config,
        }
    }

    /// Estimate every leg from `start` and store the resulting trip.
    ///
    /// Nothing is stored unless every leg was estimated.
    pub async fn plan(
        &self,
        start: LocationId,
        destinations: &[LocationId],
    ) -> Result<Trip, PlanError> {
        if destinations.is_empty() {
            return Err(PlanError::InvalidArgument(
                "location_ids must contain at least one location".to_string(),
            ));
        }

        let origin = self.locations.get(start).await?;
        let mut stops = Vec::with_capacity(destinations.len());
        for id in destinations {
            stops.push(self.locations.get(*id).await?);
        }

        let legs = self.estimate_legs(&origin, &stops).await?;
        let route = best_route(&legs);
        let totals = RouteTotals::from_legs(&legs);

        let trip = self
            .trips
            .create(|id| Trip {
                id,
                starting_from_location_id: start,
                best_route_location_ids: route,
                status: TripStatus::Planning,
                total_distance: totals.distance,
                total_uber_costs: totals.cost,
                total_uber_duration: totals.duration,
                next_leg: 0,
                leg_requests: Vec::new(),
                created_at: Utc::now(),
                pending_leg: None,
            })
            .await?;

        info!(
            trip_id = %trip.id,
            start = %start,
            legs = legs.len(),
            total_distance = trip.total_distance,
            policy = self.policy.name(),
            "planned trip"
        );

        Ok(trip)
    }

    /// Estimate each leg, `batch_size` at a time. Results come back in
    /// input order whatever order the calls complete in.
    async fn estimate_legs(
        &self,
        origin: &Location,
        stops: &[Location],
    ) -> Result<Vec<LegEstimate>, PlanError> {
        let mut legs = Vec::with_capacity(stops.len());

        for batch in stops.chunks(self.config.effective_batch_size()) {
            let mut pending = Vec::with_capacity(batch.len());
            for stop in batch {
                pending.push(self.estimate_leg(origin, stop));
            }
            legs.extend(try_join_all(pending).await?);
        }

        Ok(legs)
    }

    async fn estimate_leg(
        &self,
        origin: &Location,
        stop: &Location,
    ) -> Result<LegEstimate, PlanError> {
        let estimates = self
            .config
            .upstream
            .call("estimate", || {
                self.provider.estimate(origin.coordinate, stop.coordinate)
            })
            .await?;

        let chosen = self.policy.select_estimate(&estimates).ok_or_else(|| {
            PlanError::Upstream(format!(
                "no products quoted from location {} to location {}",
                origin.id, stop.id
            ))
        })?;

        let low_estimate = chosen.low_estimate.unwrap_or_else(|| {
            warn!(
                product = %chosen.product_id,
                destination = %stop.id,
                "estimate has no price, counting it as zero"
            );
            0
        });

        debug!(
            origin = %origin.id,
            destination = %stop.id,
            product = %chosen.product_id,
            distance = chosen.distance,
            duration = chosen.duration,
            low_estimate,
            "estimated leg"
        );

        Ok(LegEstimate {
            origin: origin.id,
            destination: stop.id,
            distance: chosen.distance,
            duration: chosen.duration,
            low_estimate,
            product_id: chosen.product_id.clone(),
        })
    }
}
