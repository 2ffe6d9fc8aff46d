//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedGeocoder;
use crate::planner::{PlannerConfig, ProgressSequence, SelectionPolicy};
use crate::store::{LocationStore, TripStore};

/// Shared application state.
///
/// Generic over the ride provider and geocoder so the same router serves
/// live clients and the offline mocks.
pub struct AppState<R, G> {
    pub locations: Arc<LocationStore>,
    pub trips: Arc<TripStore>,

    /// Ride provider used for estimates and ride requests
    pub rides: Arc<R>,

    /// Geocoder used when creating locations
    pub geocoder: Arc<CachedGeocoder<G>>,

    pub policy: Arc<dyn SelectionPolicy>,
    pub config: Arc<PlannerConfig>,
    pub progress_ids: Arc<ProgressSequence>,
}

impl<R, G> AppState<R, G> {
    /// Create a new app state.
    pub fn new(
        locations: LocationStore,
        trips: TripStore,
        rides: R,
        geocoder: CachedGeocoder<G>,
        policy: Arc<dyn SelectionPolicy>,
        config: PlannerConfig,
    ) -> Self {
        Self {
            locations: Arc::new(locations),
            trips: Arc::new(trips),
            rides: Arc::new(rides),
            geocoder: Arc::new(geocoder),
            policy,
            config: Arc::new(config),
            progress_ids: Arc::new(ProgressSequence::default()),
        }
    }
}

// Derived Clone would require `R: Clone` and `G: Clone`.
impl<R, G> Clone for AppState<R, G> {
    fn clone(&self) -> Self {
        Self {
            locations: Arc::clone(&self.locations),
            trips: Arc::clone(&self.trips),
            rides: Arc::clone(&self.rides),
            geocoder: Arc::clone(&self.geocoder),
            policy: Arc::clone(&self.policy),
            config: Arc::clone(&self.config),
            progress_ids: Arc::clone(&self.progress_ids),
        }
    }
}
