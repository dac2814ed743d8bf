//! Breaker engine.

use crate::record::now_millis;
use crate::store::{MemoryStore, RecordStore};
use crate::tripper::{Outcome, TimeTripper};
use crate::{BreakerConfig, BreakerError, BreakerRecord, RequestSpec, Response, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Named circuit breaker guarding one upstream resource.
///
/// Each `run` gate-checks the persisted record, executes the request under
/// the configured deadline, and on any fault updates the record before
/// propagating the error. Successful calls return the response untouched and
/// leave the record alone; counters only reset via window-driven
/// restoration.
#[derive(Clone)]
pub struct Breaker {
    name: String,
    config: BreakerConfig,
    store: Arc<dyn RecordStore>,
    client: reqwest::Client,
}

impl Breaker {
    /// Create a breaker with default configuration and a fresh in-memory
    /// store.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, BreakerConfig::default())
    }

    /// Create a breaker with explicit configuration.
    pub fn with_config(name: impl Into<String>, config: BreakerConfig) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");

        Self {
            name: name.into(),
            config,
            store: Arc::new(MemoryStore::new()),
            client,
        }
    }

    /// Replace the record store. Any [`RecordStore`] backend substitutes
    /// without engine changes.
    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = store;
        self
    }

    /// Get the breaker name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the breaker configuration.
    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Provision the zeroed record for this breaker if none exists.
    /// Idempotent; an existing record is returned unchanged.
    pub async fn setup(&self) -> Result<BreakerRecord> {
        let record = self
            .store
            .find_or_create(&self.name, self.config.clone())
            .await?;
        Ok(record)
    }

    /// Read the current record, if any. Convenience for monitoring.
    pub async fn record(&self) -> Result<Option<BreakerRecord>> {
        Ok(self.store.get(&self.name).await?)
    }

    /// Run a request through the breaker.
    ///
    /// Fails fast with [`BreakerError::CircuitTripped`] while the breaker is
    /// open, restores automatically once the fault window has elapsed, and
    /// records a fault against the breaker on any failure or timeout before
    /// propagating it.
    pub async fn run(&self, spec: RequestSpec) -> Result<Response> {
        self.ensure_circuit_closed().await?;

        let tripper = TimeTripper::new(self.client.clone(), self.config.request_timeout);
        match tripper.run(spec).await {
            Ok(Outcome::Success(response)) => Ok(response),
            Ok(Outcome::Failure(response)) => {
                let status = response.status().as_u16();
                let body = response.text().unwrap_or_default();
                let err = BreakerError::Upstream {
                    status,
                    message: format!("{status}: {body}"),
                };
                Err(self.fault(err).await)
            }
            Ok(Outcome::Timeout(response)) => {
                let err = BreakerError::Upstream {
                    status: response.status().as_u16(),
                    message: response.text().unwrap_or_default(),
                };
                Err(self.fault(err).await)
            }
            // Transport breakdown counts as a fault; spec errors (bad URL)
            // are the caller's bug and leave the record alone.
            Err(e @ BreakerError::Http(_)) => Err(self.fault(e).await),
            Err(e) => Err(e),
        }
    }

    /// Gate check: fail fast while tripped, restore once the window has
    /// elapsed. Store errors here abort before any request is attempted.
    async fn ensure_circuit_closed(&self) -> Result<()> {
        let record = self
            .store
            .find_or_create(&self.name, self.config.clone())
            .await?;

        if record.tripped {
            if self.should_restore(&record, now_millis()) {
                let mut restored = record;
                restored.restore();
                info!(breaker = %self.name, "circuit restored, closing");
                self.store.set(&self.name, restored).await?;
            } else {
                debug!(breaker = %self.name, "circuit open, failing fast");
                return Err(BreakerError::CircuitTripped {
                    name: self.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Record a fault, then hand back the original error. The record is
    /// re-read here because it may have changed since the gate check. A
    /// store failure on this path is logged and must not mask the fault.
    async fn fault(&self, err: BreakerError) -> BreakerError {
        let now = now_millis();
        match self
            .store
            .find_or_create(&self.name, self.config.clone())
            .await
        {
            Ok(mut record) => {
                if self.should_trip(&record, now) {
                    record.record_trip(now);
                    warn!(
                        breaker = %self.name,
                        consecutive_faults = record.consecutive_faults,
                        fault_count = record.fault_count,
                        "circuit tripped"
                    );
                } else {
                    record.record_fault(now);
                    debug!(
                        breaker = %self.name,
                        consecutive_faults = record.consecutive_faults,
                        "fault recorded"
                    );
                }
                if let Err(store_err) = self.store.set(&self.name, record).await {
                    warn!(breaker = %self.name, error = %store_err, "failed to persist fault");
                }
            }
            Err(store_err) => {
                warn!(breaker = %self.name, error = %store_err, "failed to read record on fault");
            }
        }
        err
    }

    /// Trip when the pending fault reaches the consecutive limit, or when
    /// the previous fault falls inside the active window.
    fn should_trip(&self, record: &BreakerRecord, now: u64) -> bool {
        record.consecutive_faults + 1 >= self.config.consecutive_fault_limit
            || now.saturating_sub(record.fault_timestamp)
                <= self.config.fault_window.as_millis() as u64
    }

    /// Restore once the last fault has aged out of the window.
    fn should_restore(&self, record: &BreakerRecord, now: u64) -> bool {
        now.saturating_sub(record.fault_timestamp) > self.config.fault_window.as_millis() as u64
    }
}
