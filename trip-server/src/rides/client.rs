//! Ride provider HTTP client.
//!
//! Estimates and product lookups authenticate with the server token;
//! ride requests act on behalf of a rider and use the OAuth access token.

use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::de::DeserializeOwned;

use crate::domain::Coordinate;

use super::RideProvider;
use super::error::RideError;
use super::types::{
    PriceEstimate, PriceEstimatesResponse, Product, ProductsResponse, RideReceipt,
    RideRequestBody,
};

/// Default base URL (sandbox: ride requests are simulated).
const DEFAULT_BASE_URL: &str = "https://sandbox-api.uber.com/v1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the ride client.
#[derive(Debug, Clone)]
pub struct RideConfig {
    /// Server token for estimates and products
    pub server_token: String,
    /// OAuth access token for ride requests
    pub access_token: String,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl RideConfig {
    /// Create a new config with the given tokens.
    pub fn new(server_token: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            server_token: server_token.into(),
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
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

/// HTTP client for the ride provider.
#[derive(Debug, Clone)]
pub struct RideClient {
    http: reqwest::Client,
    base_url: String,
    server_auth: HeaderValue,
    rider_auth: HeaderValue,
}

impl RideClient {
    /// Create a new ride client with the given configuration.
    pub fn new(config: RideConfig) -> Result<Self, RideError> {
        let server_auth = HeaderValue::from_str(&format!("Token {}", config.server_token))
            .map_err(|_| RideError::Config("invalid server token format".to_string()))?;
        let rider_auth = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|_| RideError::Config("invalid access token format".to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            server_auth,
            rider_auth,
        })
    }
}

impl RideProvider for RideClient {
    async fn estimate(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<PriceEstimate>, RideError> {
        let url = format!("{}/estimates/price", self.base_url);

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.server_auth.clone())
            .query(&[
                ("start_latitude", origin.lat),
                ("start_longitude", origin.lng),
                ("end_latitude", destination.lat),
                ("end_longitude", destination.lng),
            ])
            .send()
            .await?;

        let body: PriceEstimatesResponse = read_json(response).await?;
        Ok(body.prices)
    }

    async fn products(&self, at: Coordinate) -> Result<Vec<Product>, RideError> {
        let url = format!("{}/products", self.base_url);

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.server_auth.clone())
            .query(&[("latitude", at.lat), ("longitude", at.lng)])
            .send()
            .await?;

        let body: ProductsResponse = read_json(response).await?;
        Ok(body.products)
    }

    async fn request_ride(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        product_id: &str,
    ) -> Result<RideReceipt, RideError> {
        let url = format!("{}/requests", self.base_url);

        let body = RideRequestBody {
            product_id,
            start_latitude: origin.lat,
            start_longitude: origin.lng,
            end_latitude: destination.lat,
            end_longitude: destination.lng,
        };

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.rider_auth.clone())
            .json(&body)
            .send()
            .await?;

        read_json(response).await
    }
}

/// Check the status code and decode a JSON body.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RideError> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(RideError::Unauthorized);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(RideError::RateLimited);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RideError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    let body = response.text().await?;

    serde_json::from_str(&body).map_err(|e| RideError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(500).collect()),
    })
}
