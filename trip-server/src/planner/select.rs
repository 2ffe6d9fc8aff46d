//! Product selection policies.
//!
//! The provider quotes several products per leg. A policy picks the one the
//! planner uses for trip totals, and the product booked when a leg is
//! requested.

use std::fmt;
use std::sync::Arc;

use crate::rides::{PriceEstimate, Product};

/// Chooses among the products a provider offers.
pub trait SelectionPolicy: fmt::Debug + Send + Sync {
    /// Name used in configuration.
    fn name(&self) -> &'static str;

    /// Pick the estimate that stands for a leg.
    fn select_estimate<'a>(&self, estimates: &'a [PriceEstimate]) -> Option<&'a PriceEstimate>;

    /// Pick the product to book. Defaults to the first one listed.
    fn select_product<'a>(&self, products: &'a [Product]) -> Option<&'a Product> {
        products.first()
    }
}

/// Take whatever the provider lists first.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstAvailable;

impl SelectionPolicy for FirstAvailable {
    fn name(&self) -> &'static str {
        "first"
    }

    fn select_estimate<'a>(&self, estimates: &'a [PriceEstimate]) -> Option<&'a PriceEstimate> {
        estimates.first()
    }
}

/// Lowest low estimate; unpriced (metered) products rank last.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cheapest;

impl SelectionPolicy for Cheapest {
    fn name(&self) -> &'static str {
        "cheapest"
    }

    fn select_estimate<'a>(&self, estimates: &'a [PriceEstimate]) -> Option<&'a PriceEstimate> {
        estimates
            .iter()
            .min_by_key(|e| (e.low_estimate.is_none(), e.low_estimate.unwrap_or(i64::MAX)))
    }
}

/// Shortest duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fastest;

impl SelectionPolicy for Fastest {
    fn name(&self) -> &'static str {
        "fastest"
    }

    fn select_estimate<'a>(&self, estimates: &'a [PriceEstimate]) -> Option<&'a PriceEstimate> {
        estimates.iter().min_by_key(|e| e.duration)
    }
}

/// Error returned for an unrecognised policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown selection policy {0:?} (expected first, cheapest or fastest)")]
pub struct UnknownPolicy(String);

/// Look up a policy by its configuration name.
pub fn policy_by_name(name: &str) -> Result<Arc<dyn SelectionPolicy>, UnknownPolicy> {
    match name.trim().to_ascii_lowercase().as_str() {
        "first" | "" => Ok(Arc::new(FirstAvailable)),
        "cheapest" => Ok(Arc::new(Cheapest)),
        "fastest" => Ok(Arc::new(Fastest)),
        _ => Err(UnknownPolicy(name.to_string())),
    }
}
