//! Google Maps Geocoding API client.

use serde::Deserialize;

use crate::domain::{Address, Coordinate};

use super::Geocoder;
use super::error::GeocodeError;

/// Default base URL for the Geocoding API.
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Top-level geocoding response. Only the fields we read.
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
    status: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Configuration for the geocoding client.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    /// API key, sent as the `key` query parameter. May be empty.
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeocodeConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Client for the Google Maps Geocoding API.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleGeocoder {
    /// Create a new geocoding client.
    pub fn new(config: GeocodeConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
        })
    }
}

impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &Address) -> Result<Coordinate, GeocodeError> {
        let query = address.geocode_query();
        let url = format!("{}/geocode/json", self.base_url);

        let mut request = self.http.get(&url).query(&[("address", query.as_str())]);
        if !self.api_key.is_empty() {
            request = request.query(&[("key", self.api_key.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let parsed: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Json {
                message: e.to_string(),
            })?;

        first_match(parsed, query)
    }
}

/// Pick the first result of a geocoding response.
fn first_match(response: GeocodeResponse, query: String) -> Result<Coordinate, GeocodeError> {
    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Err(GeocodeError::NoMatch { query }),
        _ => {
            return Err(GeocodeError::Rejected {
                status: response.status,
            });
        }
    }

    let location = response
        .results
        .into_iter()
        .next()
        .map(|r| r.geometry.location)
        .ok_or(GeocodeError::NoMatch { query })?;

    Ok(Coordinate::new(location.lat, location.lng))
}
