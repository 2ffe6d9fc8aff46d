//! Stored locations and their coordinates.

use serde::{Deserialize, Serialize};

use super::LocationId;

/// Mean Earth radius in miles.
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Creates a coordinate from latitude and longitude.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `other` in miles.
    pub fn haversine_miles(&self, other: &Coordinate) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let d_lat = lat2 - lat1;
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_MILES * a.sqrt().asin()
    }
}

/// Postal address of a location.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    /// Free-text query sent to the geocoder: street, city and state.
    pub fn geocode_query(&self) -> String {
        [&self.address, &self.city, &self.state]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A named, geocoded location.
///
/// Coordinates are resolved once at creation. Changing the address later
/// does not move the coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(flatten)]
    pub address: Address,
    #[serde(flatten)]
    pub coordinate: Coordinate,
}

impl Location {
    /// Creates a new location.
    pub fn new(id: LocationId, name: String, address: Address, coordinate: Coordinate) -> Self {
        Self {
            id,
            name,
            address,
            coordinate,
        }
    }
}
