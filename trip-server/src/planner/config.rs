//! Planner configuration.

use crate::upstream::UpstreamPolicy;

/// Configuration parameters for planning and progression.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Maximum number of leg estimates requested concurrently.
    pub batch_size: usize,

    /// Timeout and retry budget for provider calls.
    pub upstream: UpstreamPolicy,
}

impl PlannerConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(batch_size: usize, upstream: UpstreamPolicy) -> Self {
        Self {
            batch_size,
            upstream,
        }
    }

    /// Batch size, never zero.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            batch_size: 8,
            upstream: UpstreamPolicy::default(),
        }
    }
}
