//! # circuit-guard
//!
//! A circuit breaker for outbound HTTP calls. Each named breaker tracks
//! faults against configurable thresholds, fails fast while tripped, and
//! restores automatically once the fault window has elapsed.
//!
//! ## Features
//!
//! - **Fail fast**: tripped breakers reject calls without touching the network
//! - **Timed execution**: every request runs under a hard deadline; timeouts
//!   count as faults
//! - **Automatic restoration**: the breaker closes again once the fault
//!   window has elapsed
//! - **Pluggable persistence**: fault records live behind a store trait with
//!   in-memory and Redis backends
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use circuit_guard::{Breaker, RequestSpec};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let breaker = Breaker::new("geo");
//!
//!     let response = breaker
//!         .run(RequestSpec::get("https://api.example.com/geo"))
//!         .await?;
//!
//!     println!("Status: {}", response.status());
//!     Ok(())
//! }
//! ```
//!
//! ## With Overrides and a Shared Store
//!
//! ```rust,no_run
//! use circuit_guard::{Breaker, BreakerConfig, MemoryStore, RequestSpec};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BreakerConfig::default()
//!         .with_consecutive_fault_limit(2)
//!         .with_request_timeout(Duration::from_secs(5));
//!
//!     let store = Arc::new(MemoryStore::new());
//!     let breaker = Breaker::with_config("geo", config).with_store(store);
//!     breaker.setup().await?;
//!
//!     // Faults accumulate on the record; once tripped, calls fail fast
//!     // until the fault window has elapsed.
//!     let response = breaker
//!         .run(RequestSpec::post("https://api.example.com/orders")
//!             .json(&serde_json::json!({"item": "widget", "quantity": 5})))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod breaker;
mod config;
mod error;
mod record;
mod request;
mod response;
mod store;
mod tripper;

pub use breaker::Breaker;
pub use config::BreakerConfig;
pub use error::{BreakerError, Result};
pub use record::BreakerRecord;
pub use request::RequestSpec;
pub use response::Response;
#[cfg(feature = "redis")]
pub use store::RedisStore;
pub use store::{MemoryStore, RecordStore, StoreError, StoreResult};
pub use tripper::{Outcome, TimeTripper};

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use circuit_guard::prelude::*;
/// ```
pub mod prelude {
    pub use crate::breaker::Breaker;
    pub use crate::config::BreakerConfig;
    pub use crate::error::{BreakerError, Result};
    pub use crate::record::BreakerRecord;
    pub use crate::request::RequestSpec;
    pub use crate::response::Response;
    #[cfg(feature = "redis")]
    pub use crate::store::RedisStore;
    pub use crate::store::{MemoryStore, RecordStore, StoreError, StoreResult};
    pub use crate::tripper::{Outcome, TimeTripper};
    pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
}
