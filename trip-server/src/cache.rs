//! Caching layer for geocoding responses.
//!
//! Geocoding the same address twice returns the same answer, and the
//! geocoding API is billed per request, so successful lookups are cached
//! by normalized query text. Failures are never cached.

use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::{Address, Coordinate};
use crate::geocode::{GeocodeError, Geocoder};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Geocoder with caching.
///
/// Wraps any `Geocoder` and caches successful lookups.
#[derive(Clone)]
pub struct CachedGeocoder<G> {
    inner: G,
    cache: MokaCache<String, Coordinate>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    /// Create a new cached geocoder.
    pub fn new(inner: G, config: &CacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, cache }
    }
}

impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn geocode(&self, address: &Address) -> Result<Coordinate, GeocodeError> {
        let key = cache_key(address);

        // Try cache first
        if let Some(cached) = self.cache.get(&key).await {
            debug!(query = %key, "geocode cache hit");
            return Ok(cached);
        }

        let coordinate = self.inner.geocode(address).await?;
        self.cache.insert(key, coordinate).await;

        Ok(coordinate)
    }
}

/// Cache key: the geocode query, case- and whitespace-insensitive.
fn cache_key(address: &Address) -> String {
    address
        .geocode_query()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Geocoder that counts calls and always answers the same point.
    #[derive(Clone, Default)]
    struct CountingGeocoder {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl Geocoder for CountingGeocoder {
        async fn geocode(&self, address: &Address) -> Result<Coordinate, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GeocodeError::NoMatch {
                    query: address.geocode_query(),
                });
            }
            Ok(Coordinate::new(1.0, 2.0))
        }
    }

    fn address(street: &str) -> Address {
        Address {
            address: street.to_string(),
            city: "Oakland".to_string(),
            state: "CA".to_string(),
            zip: String::new(),
        }
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(86_400));
        assert_eq!(config.max_capacity, 10_000);
    }

    #[test]
    fn cache_key_normalizes() {
        assert_eq!(cache_key(&address("1  Broadway")), "1 broadway oakland ca");
    }

    #[tokio::test]
    async fn second_lookup_hits_cache() {
        let inner = CountingGeocoder::default();
        let calls = inner.calls.clone();
        let cached = CachedGeocoder::new(inner, &CacheConfig::default());

        let a = cached.geocode(&address("1 Broadway")).await.unwrap();
        let b = cached.geocode(&address("1 BROADWAY")).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let inner = CountingGeocoder {
            fail: true,
            ..CountingGeocoder::default()
        };
        let calls = inner.calls.clone();
        let cached = CachedGeocoder::new(inner, &CacheConfig::default());

        assert!(cached.geocode(&address("Nowhere")).await.is_err());
        assert!(cached.geocode(&address("Nowhere")).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
