//! Ride-pricing and ride-request provider.
//!
//! The planner only needs three calls from the provider: price estimates
//! between two points, the product catalog at a point, and a ride request.
//! `RideProvider` is the seam; `RideClient` talks to the HTTP API and
//! `MockRideProvider` answers deterministically for tests and offline use.

mod client;
mod error;
mod mock;
mod types;

use std::future::Future;

use crate::domain::Coordinate;

pub use client::{RideClient, RideConfig};
pub use error::RideError;
pub use mock::{IssuedRide, MockRideProvider};
pub use types::{PriceEstimate, Product, RideReceipt};

/// Source of ride prices and ride requests.
///
/// This abstraction allows the planner to be tested with mock data.
pub trait RideProvider: Send + Sync {
    /// Price estimates for every product between two points.
    fn estimate(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> impl Future<Output = Result<Vec<PriceEstimate>, RideError>> + Send;

    /// Products available at a point.
    fn products(
        &self,
        at: Coordinate,
    ) -> impl Future<Output = Result<Vec<Product>, RideError>> + Send;

    /// Request a ride. Not idempotent: every call books a ride.
    fn request_ride(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        product_id: &str,
    ) -> impl Future<Output = Result<RideReceipt, RideError>> + Send;
}
