//! Shared fixture for planner tests.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::domain::{Address, Coordinate, LocationId};
use crate::rides::MockRideProvider;
use crate::store::{LocationStore, TripStore};

use super::{FirstAvailable, PlannerConfig, ProgressSequence, RoutePlanner, TripProgressor};

pub(crate) struct Fixture {
    pub locations: LocationStore,
    pub trips: TripStore,
    pub rides: MockRideProvider,
    pub config: PlannerConfig,
    pub policy: FirstAvailable,
    pub sequence: ProgressSequence,
    placed: AtomicU32,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            locations: LocationStore::in_memory(),
            trips: TripStore::in_memory(),
            rides: MockRideProvider::new(),
            config: PlannerConfig::default(),
            policy: FirstAvailable,
            sequence: ProgressSequence::default(),
            placed: AtomicU32::new(0),
        }
    }

    pub async fn location_at(&self, lat: f64, lng: f64) -> LocationId {
        let n = self.placed.fetch_add(1, Ordering::Relaxed);
        let address = Address {
            address: format!("{n} Test Street"),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip: "62701".to_string(),
        };
        self.locations
            .create(format!("stop {n}"), address, Coordinate::new(lat, lng))
            .await
            .unwrap()
            .id
    }

    /// A location the mock provider reports as `miles` away from anywhere.
    pub async fn location_at_distance(&self, miles: f64) -> LocationId {
        let n = self.placed.load(Ordering::Relaxed) as f64;
        let coordinate = Coordinate::new(10.0 + n * 0.01, 20.0 + n * 0.01);
        self.rides.set_distance(coordinate, miles);
        self.location_at(coordinate.lat, coordinate.lng).await
    }

    pub fn planner(&self) -> RoutePlanner<'_, MockRideProvider> {
        RoutePlanner::new(
            &self.rides,
            &self.locations,
            &self.trips,
            &self.policy,
            &self.config,
        )
    }

    pub fn progressor(&self) -> TripProgressor<'_, MockRideProvider> {
        TripProgressor::new(
            &self.rides,
            &self.locations,
            &self.trips,
            &self.policy,
            &self.config,
            &self.sequence,
        )
    }
}
