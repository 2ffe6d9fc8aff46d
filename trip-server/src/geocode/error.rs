//! Geocoding error types.

use std::time::Duration;

/// Errors that can occur when geocoding an address.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Geocoder answered with a non-OK status (e.g. REQUEST_DENIED)
    #[error("geocoder rejected request: {status}")]
    Rejected { status: String },

    /// Address did not match anything
    #[error("no match for address {query:?}")]
    NoMatch { query: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// No answer within the configured timeout
    #[error("geocoder timed out after {0:?}")]
    Timeout(Duration),
}
