//! Bounded calls to external providers.
//!
//! Every provider call runs under a timeout. Idempotent reads may be
//! retried a fixed number of times, immediately and only on transient
//! failures; ride requests go through [`UpstreamPolicy::once`] because
//! each call books a ride.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::geocode::GeocodeError;
use crate::rides::RideError;

/// Errors a provider call can end with.
pub trait UpstreamFailure: Display {
    /// The error reported when a call exceeds its timeout.
    fn timed_out(after: Duration) -> Self;

    /// Whether repeating the same call might succeed.
    fn is_transient(&self) -> bool;
}

impl UpstreamFailure for RideError {
    fn timed_out(after: Duration) -> Self {
        RideError::Timeout(after)
    }

    fn is_transient(&self) -> bool {
        match self {
            RideError::Http(_) | RideError::Timeout(_) | RideError::RateLimited => true,
            RideError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl UpstreamFailure for GeocodeError {
    fn timed_out(after: Duration) -> Self {
        GeocodeError::Timeout(after)
    }

    fn is_transient(&self) -> bool {
        match self {
            GeocodeError::Http(_) | GeocodeError::Timeout(_) => true,
            GeocodeError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Timeout and retry budget for provider calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamPolicy {
    /// Limit for a single attempt.
    pub timeout: Duration,
    /// Extra attempts after a transient failure.
    pub retries: u32,
}

impl Default for UpstreamPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 1,
        }
    }
}

impl UpstreamPolicy {
    /// Create a policy.
    pub fn new(timeout: Duration, retries: u32) -> Self {
        Self { timeout, retries }
    }

    /// Run an idempotent call, retrying transient failures.
    pub async fn call<T, E, F, Fut>(&self, label: &'static str, mut op: F) -> Result<T, E>
    where
        E: UpstreamFailure,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(op()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt <= self.retries => {
                    warn!(call = label, attempt, error = %e, "provider call failed, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Run a call exactly once, under the timeout.
    pub async fn once<T, E, Fut>(&self, fut: Fut) -> Result<T, E>
    where
        E: UpstreamFailure,
        Fut: Future<Output = Result<T, E>>,
    {
        self.attempt(fut).await
    }

    async fn attempt<T, E, Fut>(&self, fut: Fut) -> Result<T, E>
    where
        E: UpstreamFailure,
        Fut: Future<Output = Result<T, E>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(E::timed_out(self.timeout)),
        }
    }
}
