//! Address geocoding.
//!
//! Locations are geocoded once, when created. `GoogleGeocoder` calls the
//! Google Maps Geocoding API; `StaticGeocoder` serves a fixed table for
//! tests and offline runs.

mod client;
mod error;
mod mock;

use std::future::Future;

use crate::domain::{Address, Coordinate};

pub use client::{GeocodeConfig, GoogleGeocoder};
pub use error::GeocodeError;
pub use mock::StaticGeocoder;

/// Resolves a postal address to coordinates.
pub trait Geocoder: Send + Sync {
    /// Geocode an address, returning the best match.
    fn geocode(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Coordinate, GeocodeError>> + Send;
}
