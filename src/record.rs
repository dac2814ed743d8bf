//! Persisted fault-tracking record.

use crate::config::BreakerConfig;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as unix-epoch milliseconds.
///
/// Records use epoch millis rather than monotonic instants so the zero
/// sentinel and the window arithmetic survive serialization and process
/// restarts under a durable store.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One fault-tracking record per breaker name. The sole persisted entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakerRecord {
    /// Breaker name; primary key in the store.
    pub name: String,
    /// Faults since the last restoration.
    pub consecutive_faults: u32,
    /// Faults observed within the current fault window.
    pub fault_count: u32,
    /// Time of the most recent fault, epoch millis; 0 = never faulted.
    pub fault_timestamp: u64,
    /// Whether the breaker is currently open (failing fast).
    pub tripped: bool,
    /// Time the breaker last tripped, epoch millis; 0 = never tripped.
    pub trip_timestamp: u64,
    /// Thresholds in effect when the record was created.
    pub config: BreakerConfig,
}

impl BreakerRecord {
    /// Create a zeroed, untripped record bound to `config`.
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            name: name.into(),
            consecutive_faults: 0,
            fault_count: 0,
            fault_timestamp: 0,
            tripped: false,
            trip_timestamp: 0,
            config,
        }
    }

    /// Record a fault that trips the breaker.
    pub(crate) fn record_trip(&mut self, now: u64) {
        self.consecutive_faults += 1;
        self.fault_count += 1;
        self.fault_timestamp = now;
        self.tripped = true;
        self.trip_timestamp = now;
    }

    /// Record a fault without tripping.
    pub(crate) fn record_fault(&mut self, now: u64) {
        self.consecutive_faults += 1;
        self.fault_count += 1;
        self.fault_timestamp = now;
    }

    /// Reset the record to its closed, zeroed state.
    pub(crate) fn restore(&mut self) {
        self.consecutive_faults = 0;
        self.fault_count = 0;
        self.fault_timestamp = 0;
        self.tripped = false;
        self.trip_timestamp = 0;
    }
}
