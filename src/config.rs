//! Breaker configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-breaker configuration.
///
/// Built once at breaker construction and snapshotted into the persisted
/// record, so a durable store keeps the thresholds that were in effect when
/// the record was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Sliding window during which faults accumulate and a tripped breaker
    /// is kept open.
    pub fault_window: Duration,
    /// Cooldown after a trip before restoration may be considered.
    pub trip_cooldown: Duration,
    /// Consecutive faults that trip the breaker.
    pub consecutive_fault_limit: u32,
    /// Faults within the window that trip the breaker.
    pub windowed_fault_limit: u32,
    /// Hard deadline for a single outbound request.
    pub request_timeout: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            fault_window: Duration::from_secs(10 * 60),
            trip_cooldown: Duration::from_secs(5 * 60),
            consecutive_fault_limit: 3,
            windowed_fault_limit: 5,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl BreakerConfig {
    /// Create a config with the given consecutive-fault limit and fault window.
    pub fn new(consecutive_fault_limit: u32, fault_window: Duration) -> Self {
        Self {
            consecutive_fault_limit,
            fault_window,
            ..Default::default()
        }
    }

    /// Set the fault window.
    pub fn with_fault_window(mut self, window: Duration) -> Self {
        self.fault_window = window;
        self
    }

    /// Set the trip cooldown.
    pub fn with_trip_cooldown(mut self, cooldown: Duration) -> Self {
        self.trip_cooldown = cooldown;
        self
    }

    /// Set the consecutive-fault limit.
    pub fn with_consecutive_fault_limit(mut self, limit: u32) -> Self {
        self.consecutive_fault_limit = limit;
        self
    }

    /// Set the windowed-fault limit.
    pub fn with_windowed_fault_limit(mut self, limit: u32) -> Self {
        self.windowed_fault_limit = limit;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
