//! Data transfer objects for web requests and responses.
//!
//! Stored records (`Location`, `Trip`) and `ProgressSnapshot` serialize
//! directly; only request bodies and errors need their own shapes.

use serde::{Deserialize, Serialize};

use crate::domain::{Address, LocationId};

/// Body of `POST /locations`.
///
/// Older clients send capitalised keys (`Name`, `Address`, ...), so both
/// spellings are accepted.
#[derive(Debug, Deserialize)]
pub struct CreateLocationRequest {
    #[serde(alias = "Name")]
    pub name: String,

    #[serde(alias = "Address")]
    pub address: String,

    #[serde(alias = "City")]
    pub city: String,

    #[serde(alias = "State")]
    pub state: String,

    /// Not used for geocoding
    #[serde(alias = "Zip", default)]
    pub zip: String,
}

impl CreateLocationRequest {
    /// Split into the location name and its address.
    pub fn into_parts(self) -> (String, Address) {
        let address = Address {
            address: self.address,
            city: self.city,
            state: self.state,
            zip: self.zip,
        };
        (self.name, address)
    }
}

/// Body of `PUT /locations/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateLocationRequest {
    #[serde(alias = "Address")]
    pub address: String,

    #[serde(alias = "City")]
    pub city: String,

    #[serde(alias = "State")]
    pub state: String,

    #[serde(alias = "Zip", default)]
    pub zip: String,
}

impl From<UpdateLocationRequest> for Address {
    fn from(req: UpdateLocationRequest) -> Self {
        Address {
            address: req.address,
            city: req.city,
            state: req.state,
            zip: req.zip,
        }
    }
}

/// Body of `POST /trips`.
#[derive(Debug, Deserialize)]
pub struct PlanTripRequest {
    pub starting_from_location_id: LocationId,

    /// Destinations, in any order
    pub location_ids: Vec<LocationId>,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
