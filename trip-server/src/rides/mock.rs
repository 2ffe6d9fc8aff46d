//! Mock ride provider for testing without API access.
//!
//! Distances are great-circle distances between the two points (rounded to
//! hundredths of a mile, like the live API) unless overridden per
//! destination. Every product is quoted on every leg.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::Coordinate;

use super::RideProvider;
use super::error::RideError;
use super::types::{PriceEstimate, Product, RideReceipt};

/// Average driving speed used to derive durations.
const MOCK_SPEED_MPH: f64 = 20.0;

/// Flat fare added to every estimate.
const BASE_FARE: f64 = 3.0;

/// Fare per mile for the cheapest product.
const PER_MILE: f64 = 2.0;

/// Driver ETA reported for every ride request, in minutes.
const MOCK_ETA_MINS: i64 = 5;

/// A ride booked through the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedRide {
    pub request_id: String,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub product_id: String,
}

#[derive(Debug, Default)]
struct MockState {
    products: Vec<(Product, f64)>,
    distance_overrides: HashMap<(u64, u64), f64>,
    fail_estimates: bool,
    fail_requests: bool,
    estimate_calls: usize,
    issued: Vec<IssuedRide>,
}

/// Deterministic in-process ride provider.
#[derive(Debug, Clone)]
pub struct MockRideProvider {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockRideProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRideProvider {
    /// Create a mock offering two products: "uberX" and a pricier "uberXL".
    pub fn new() -> Self {
        let state = MockState {
            products: vec![
                (mock_product("uberx", "uberX", 4), 1.0),
                (mock_product("uberxl", "uberXL", 6), 1.5),
            ],
            ..MockState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Replace the product catalog. Each product is paired with a fare
    /// multiplier. An empty catalog makes estimates and lookups return
    /// no products.
    pub fn with_products(self, products: Vec<(Product, f64)>) -> Self {
        self.set_products(products);
        self
    }

    /// Replace the product catalog in place.
    pub fn set_products(&self, products: Vec<(Product, f64)>) {
        self.lock().products = products;
    }

    /// Report `miles` for every leg ending at `destination`.
    pub fn with_distance(self, destination: Coordinate, miles: f64) -> Self {
        self.set_distance(destination, miles);
        self
    }

    /// Report `miles` for every leg ending at `destination`.
    pub fn set_distance(&self, destination: Coordinate, miles: f64) {
        self.lock()
            .distance_overrides
            .insert(coordinate_key(&destination), miles);
    }

    /// Make estimate calls fail (or succeed again).
    pub fn set_fail_estimates(&self, fail: bool) {
        self.lock().fail_estimates = fail;
    }

    /// Make ride requests fail (or succeed again).
    pub fn set_fail_requests(&self, fail: bool) {
        self.lock().fail_requests = fail;
    }

    /// Rides booked so far, oldest first.
    pub fn issued_rides(&self) -> Vec<IssuedRide> {
        self.lock().issued.clone()
    }

    /// Number of estimate calls received.
    pub fn estimate_calls(&self) -> usize {
        self.lock().estimate_calls
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panic while holding the lock cannot leave the state half-updated
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RideProvider for MockRideProvider {
    async fn estimate(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<PriceEstimate>, RideError> {
        let mut state = self.lock();
        state.estimate_calls += 1;

        if state.fail_estimates {
            return Err(RideError::Api {
                status: 500,
                message: "mock estimate failure".to_string(),
            });
        }

        let distance = state
            .distance_overrides
            .get(&coordinate_key(&destination))
            .copied()
            .unwrap_or_else(|| (origin.haversine_miles(&destination) * 100.0).round() / 100.0);
        let duration = (distance / MOCK_SPEED_MPH * 3600.0).round() as i64;

        let estimates = state
            .products
            .iter()
            .map(|(product, multiplier)| {
                let low = ((BASE_FARE + PER_MILE * distance) * multiplier).ceil() as i64;
                let high = (low as f64 * 1.25).ceil() as i64;
                PriceEstimate {
                    product_id: product.product_id.clone(),
                    currency_code: Some("USD".to_string()),
                    display_name: product.display_name.clone(),
                    estimate: Some(format!("${low}-{high}")),
                    low_estimate: Some(low),
                    high_estimate: Some(high),
                    surge_multiplier: Some(1.0),
                    duration,
                    distance,
                }
            })
            .collect();

        Ok(estimates)
    }

    async fn products(&self, _at: Coordinate) -> Result<Vec<Product>, RideError> {
        let state = self.lock();
        Ok(state.products.iter().map(|(p, _)| p.clone()).collect())
    }

    async fn request_ride(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        product_id: &str,
    ) -> Result<RideReceipt, RideError> {
        let mut state = self.lock();

        if state.fail_requests {
            return Err(RideError::Api {
                status: 409,
                message: "mock request failure".to_string(),
            });
        }

        let request_id = format!("mock-request-{}", state.issued.len() + 1);
        state.issued.push(IssuedRide {
            request_id: request_id.clone(),
            origin,
            destination,
            product_id: product_id.to_string(),
        });

        Ok(RideReceipt {
            request_id,
            status: "processing".to_string(),
            eta: Some(MOCK_ETA_MINS),
            surge_multiplier: Some(1.0),
        })
    }
}

fn mock_product(id: &str, name: &str, capacity: u32) -> Product {
    Product {
        product_id: id.to_string(),
        description: format!("Mock {name}"),
        display_name: name.to_string(),
        capacity,
        image: None,
    }
}

fn coordinate_key(c: &Coordinate) -> (u64, u64) {
    (c.lat.to_bits(), c.lng.to_bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn estimates_every_product() {
        let mock = MockRideProvider::new();
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.1, 0.0);

        let estimates = mock.estimate(a, b).await.unwrap();
        assert_eq!(estimates.len(), 2);
        assert_eq!(estimates[0].product_id, "uberx");
        assert!((estimates[0].distance - 6.91).abs() < 0.01);
        assert!(estimates[1].low_estimate > estimates[0].low_estimate);
        assert_eq!(mock.estimate_calls(), 1);
    }

    #[tokio::test]
    async fn distance_override_applies_to_destination() {
        let b = Coordinate::new(1.0, 1.0);
        let mock = MockRideProvider::new().with_distance(b, 5.0);

        let estimates = mock.estimate(Coordinate::new(0.0, 0.0), b).await.unwrap();
        assert_eq!(estimates[0].distance, 5.0);
        assert_eq!(estimates[0].duration, 900);
        assert_eq!(estimates[0].low_estimate, Some(13));
    }

    #[tokio::test]
    async fn empty_catalog_returns_no_estimates() {
        let mock = MockRideProvider::new().with_products(Vec::new());
        let estimates = mock
            .estimate(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0))
            .await
            .unwrap();
        assert!(estimates.is_empty());
    }

    #[tokio::test]
    async fn records_issued_rides() {
        let mock = MockRideProvider::new();
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 1.0);

        let receipt = mock.request_ride(a, b, "uberx").await.unwrap();
        assert_eq!(receipt.request_id, "mock-request-1");
        assert_eq!(receipt.eta, Some(MOCK_ETA_MINS));

        let issued = mock.issued_rides();
        assert_eq!(issued.len(), 1);
        assert_eq!(issued[0].product_id, "uberx");
        assert_eq!(issued[0].destination, b);
    }

    #[tokio::test]
    async fn failure_switches() {
        let mock = MockRideProvider::new();
        let a = Coordinate::new(0.0, 0.0);

        mock.set_fail_estimates(true);
        assert!(mock.estimate(a, a).await.is_err());

        mock.set_fail_requests(true);
        assert!(mock.request_ride(a, a, "uberx").await.is_err());
        assert!(mock.issued_rides().is_empty());
    }
}
