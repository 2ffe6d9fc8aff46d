//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::geocode::GeocodeConfig;
use crate::planner::{PlannerConfig, SelectionPolicy, UnknownPolicy, policy_by_name};
use crate::rides::RideConfig;
use crate::upstream::UpstreamPolicy;

/// Default listen address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to something unusable
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Policy(#[from] UnknownPolicy),
}

/// Everything `main` needs to assemble the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub geocode_api_key: String,
    pub geocode_base_url: Option<String>,
    pub ride_server_token: String,
    pub ride_access_token: String,
    pub ride_base_url: Option<String>,
    pub upstream: UpstreamPolicy,
    pub selection_policy: String,

    /// Directory for location and trip snapshots; memory only when unset
    pub data_dir: Option<PathBuf>,

    /// Serve from the in-process mock providers instead of the live APIs
    pub offline: bool,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's
    /// value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let addr_raw = var("TRIP_PLANNER_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_raw.trim().parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "TRIP_PLANNER_ADDR",
            value: addr_raw.clone(),
            reason: format!("{e}"),
        })?;

        let defaults = UpstreamPolicy::default();
        let timeout = match var("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => match parse_number::<u64>("UPSTREAM_TIMEOUT_SECS", &raw)? {
                0 => {
                    return Err(ConfigError::Invalid {
                        var: "UPSTREAM_TIMEOUT_SECS",
                        value: raw,
                        reason: "must be at least 1 second".to_string(),
                    });
                }
                secs => Duration::from_secs(secs),
            },
            None => defaults.timeout,
        };
        let retries = match var("UPSTREAM_RETRIES") {
            Some(raw) => parse_number("UPSTREAM_RETRIES", &raw)?,
            None => defaults.retries,
        };

        let selection_policy = var("SELECTION_POLICY").unwrap_or_else(|| "first".to_string());
        // Fail at startup rather than on the first request
        policy_by_name(&selection_policy)?;

        let offline = match var("TRIP_PLANNER_OFFLINE") {
            Some(raw) => parse_flag("TRIP_PLANNER_OFFLINE", &raw)?,
            None => false,
        };

        let config = Self {
            addr,
            geocode_api_key: var("GEOCODE_API_KEY").unwrap_or_default(),
            geocode_base_url: var("GEOCODE_BASE_URL"),
            ride_server_token: var("RIDE_SERVER_TOKEN").unwrap_or_default(),
            ride_access_token: var("RIDE_ACCESS_TOKEN").unwrap_or_default(),
            ride_base_url: var("RIDE_BASE_URL"),
            upstream: UpstreamPolicy::new(timeout, retries),
            selection_policy,
            data_dir: var("TRIP_PLANNER_DATA_DIR").map(PathBuf::from),
            offline,
        };

        if !config.offline {
            config.warn_missing_credentials();
        }

        Ok(config)
    }

    fn warn_missing_credentials(&self) {
        for (var, value) in [
            ("GEOCODE_API_KEY", &self.geocode_api_key),
            ("RIDE_SERVER_TOKEN", &self.ride_server_token),
            ("RIDE_ACCESS_TOKEN", &self.ride_access_token),
        ] {
            if value.is_empty() {
                warn!(var, "not set, calls needing it will fail");
            }
        }
    }

    /// Ride API client configuration.
    pub fn ride_config(&self) -> RideConfig {
        let config = RideConfig::new(&self.ride_server_token, &self.ride_access_token)
            .with_timeout(self.upstream.timeout.as_secs());
        match &self.ride_base_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }

    /// Geocoding API client configuration.
    pub fn geocode_config(&self) -> GeocodeConfig {
        let config =
            GeocodeConfig::new(&self.geocode_api_key).with_timeout(self.upstream.timeout.as_secs());
        match &self.geocode_base_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }

    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            upstream: self.upstream,
            ..PlannerConfig::default()
        }
    }

    /// The configured selection policy.
    pub fn policy(&self) -> Result<Arc<dyn SelectionPolicy>, ConfigError> {
        Ok(policy_by_name(&self.selection_policy)?)
    }
}

fn parse_number<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.addr, DEFAULT_ADDR.parse().unwrap());
        assert_eq!(config.upstream, UpstreamPolicy::default());
        assert_eq!(config.selection_policy, "first");
        assert!(config.data_dir.is_none());
        assert!(!config.offline);
        assert_eq!(config.policy().unwrap().name(), "first");
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            ("TRIP_PLANNER_ADDR", "127.0.0.1:9000"),
            ("GEOCODE_API_KEY", "gkey"),
            ("RIDE_SERVER_TOKEN", "server"),
            ("RIDE_ACCESS_TOKEN", "access"),
            ("RIDE_BASE_URL", "http://localhost:4000/v1"),
            ("UPSTREAM_TIMEOUT_SECS", "3"),
            ("UPSTREAM_RETRIES", "0"),
            ("SELECTION_POLICY", "Cheapest"),
            ("TRIP_PLANNER_DATA_DIR", "/var/lib/trips"),
            ("TRIP_PLANNER_OFFLINE", "yes"),
        ])
        .unwrap();

        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.geocode_api_key, "gkey");
        assert_eq!(config.ride_base_url.as_deref(), Some("http://localhost:4000/v1"));
        assert_eq!(config.upstream.timeout, Duration::from_secs(3));
        assert_eq!(config.upstream.retries, 0);
        assert_eq!(config.policy().unwrap().name(), "cheapest");
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/trips")));
        assert!(config.offline);
        assert_eq!(config.planner_config().upstream.retries, 0);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config(&[("TRIP_PLANNER_ADDR", "  "), ("RIDE_BASE_URL", "")]).unwrap();
        assert_eq!(config.addr, DEFAULT_ADDR.parse().unwrap());
        assert!(config.ride_base_url.is_none());
    }

    #[test]
    fn invalid_numbers_are_errors() {
        let err = config(&[("UPSTREAM_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "UPSTREAM_TIMEOUT_SECS",
                ..
            }
        ));

        assert!(config(&[("UPSTREAM_RETRIES", "-1")]).is_err());
        assert!(config(&[("TRIP_PLANNER_ADDR", "nowhere")]).is_err());
        assert!(config(&[("TRIP_PLANNER_OFFLINE", "maybe")]).is_err());
    }

    #[test]
    fn zero_timeout_is_error() {
        let err = config(&[("UPSTREAM_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "UPSTREAM_TIMEOUT_SECS",
                ..
            }
        ));
        assert_eq!(
            config(&[("UPSTREAM_TIMEOUT_SECS", "1")]).unwrap().upstream.timeout,
            Duration::from_secs(1)
        );
    }

    #[test]
    fn unknown_policy_is_error() {
        let err = config(&[("SELECTION_POLICY", "random")]).unwrap_err();
        assert!(matches!(err, ConfigError::Policy(_)));
    }
}
