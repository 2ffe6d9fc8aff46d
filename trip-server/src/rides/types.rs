//! Wire types for the ride provider API.

use serde::{Deserialize, Serialize};

/// Response of `GET /estimates/price`.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceEstimatesResponse {
    pub prices: Vec<PriceEstimate>,
}

/// Price estimate for one product on one origin → destination pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub product_id: String,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub display_name: String,
    /// Human-readable range, e.g. "$12-16"
    #[serde(default)]
    pub estimate: Option<String>,
    /// Null for metered products
    #[serde(default)]
    pub low_estimate: Option<i64>,
    #[serde(default)]
    pub high_estimate: Option<i64>,
    #[serde(default)]
    pub surge_multiplier: Option<f64>,
    /// Expected trip duration in seconds
    pub duration: i64,
    /// Expected trip distance in miles
    pub distance: f64,
}

/// Response of `GET /products`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

/// A ride product available at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

/// Body of `POST /requests`.
#[derive(Debug, Clone, Serialize)]
pub struct RideRequestBody<'a> {
    pub product_id: &'a str,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub end_latitude: f64,
    pub end_longitude: f64,
}

/// Provider's acknowledgement of a ride request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideReceipt {
    pub request_id: String,
    #[serde(default)]
    pub status: String,
    /// Driver ETA in minutes
    #[serde(default)]
    pub eta: Option<i64>,
    #[serde(default)]
    pub surge_multiplier: Option<f64>,
}
