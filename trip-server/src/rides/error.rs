//! Ride provider error types.

use std::time::Duration;

/// Errors from the ride-pricing and ride-request provider.
#[derive(Debug, thiserror::Error)]
pub enum RideError {
    /// HTTP request failed (network error, connection refused, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Token rejected
    #[error("unauthorized: check RIDE_SERVER_TOKEN and RIDE_ACCESS_TOKEN")]
    Unauthorized,

    /// Rate limited by the API
    #[error("rate limited by ride provider")]
    RateLimited,

    /// No answer within the configured timeout
    #[error("ride provider timed out after {0:?}")]
    Timeout(Duration),

    /// Client misconfigured (bad token format, etc.)
    #[error("invalid ride client configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RideError::Api {
            status: 422,
            message: "distance exceeded".into(),
        };
        assert_eq!(err.to_string(), "API error 422: distance exceeded");

        let err = RideError::Timeout(Duration::from_secs(3));
        assert_eq!(err.to_string(), "ride provider timed out after 3s");

        let err = RideError::Json {
            message: "missing field `prices`".into(),
            body: Some("{}".into()),
        };
        assert!(err.to_string().contains("missing field"));
    }
}
