//! Timeout-bounded request execution.

use crate::{RequestSpec, Response, Result};
use std::time::Duration;
use tracing::debug;

/// Status code reported for a timed-out request.
pub(crate) const TIMEOUT_STATUS: u16 = 500;
/// Body reported for a timed-out request.
pub(crate) const TIMEOUT_BODY: &str = "Request timed out";

/// Terminal outcome of a single timed execution.
///
/// Exactly one variant is produced per run; the race between the deadline
/// and the request has no observable loser.
#[derive(Debug)]
pub enum Outcome {
    /// Status 200 arrived before the deadline.
    Success(Response),
    /// A non-200 status arrived before the deadline.
    Failure(Response),
    /// The deadline elapsed first; carries the synthetic 500 response.
    Timeout(Response),
}

/// Executes one outbound request under a hard deadline.
pub struct TimeTripper {
    client: reqwest::Client,
    timeout: Duration,
}

impl TimeTripper {
    /// Create a tripper around a transport client and a deadline.
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Run the request. Resolves with exactly one [`Outcome`], or an error
    /// when the spec is unbuildable or the transport broke down before any
    /// response existed.
    pub async fn run(&self, spec: RequestSpec) -> Result<Outcome> {
        let request = spec.into_reqwest(&self.client)?;

        // When the deadline wins, the request future is dropped here, which
        // aborts the in-flight call; a late completion can never surface.
        match tokio::time::timeout(self.timeout, self.client.execute(request)).await {
            Ok(Ok(raw)) => {
                let response = Response::from_reqwest(raw).await;
                if response.status() == http::StatusCode::OK {
                    Ok(Outcome::Success(response))
                } else {
                    debug!(status = %response.status(), "upstream returned non-200");
                    Ok(Outcome::Failure(response))
                }
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                debug!(timeout = ?self.timeout, "request deadline elapsed");
                Ok(Outcome::Timeout(Response::synthetic(
                    TIMEOUT_STATUS,
                    TIMEOUT_BODY,
                )))
            }
        }
    }
}
