//! Per-leg price estimates produced while planning.

use super::LocationId;

/// Estimate for one origin → destination leg.
///
/// Transient: built during planning and folded into trip totals.
#[derive(Debug, Clone, PartialEq)]
pub struct LegEstimate {
    pub origin: LocationId,
    pub destination: LocationId,
    /// Distance in miles.
    pub distance: f64,
    /// Duration in seconds.
    pub duration: i64,
    /// Lowest price estimate, in whole currency units.
    pub low_estimate: i64,
    pub product_id: String,
}
