//! Back-off policy for transient Open Food Facts failures.
//!
//! Timeouts, connection errors, 5xx, and 429 are retried. A 404, a malformed
//! body, or a bad barcode is returned at once.

use std::future::Future;
use std::time::Duration;

use crate::error::OpenFoodError;

/// Ceiling on a single back-off sleep. Lookups run while a user waits.
const MAX_DELAY_MS: u64 = 10_000;

pub(crate) fn is_retriable(err: &OpenFoodError) -> bool {
    match err {
        OpenFoodError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        OpenFoodError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        OpenFoodError::NotFound { .. }
        | OpenFoodError::Deserialize { .. }
        | OpenFoodError::InvalidBaseUrl { .. }
        | OpenFoodError::InvalidBarcode(_) => false,
    }
}

/// How many extra attempts a request gets and how long to wait between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub(crate) max_retries: u32,
    pub(crate) backoff_base_ms: u64,
}

impl RetryPolicy {
    /// Sleep before retry number `retry` (1-based): `base * 2^(retry-1)`,
    /// capped, then scaled by `jitter` (expected in `0.75..=1.25`).
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub(crate) fn delay_for(&self, retry: u32, jitter: f64) -> Duration {
        let exponent = retry.saturating_sub(1).min(10);
        let nominal = self
            .backoff_base_ms
            .saturating_mul(1u64 << exponent)
            .min(MAX_DELAY_MS);
        Duration::from_millis((nominal as f64 * jitter).max(0.0) as u64)
    }

    /// Runs `operation`, retrying transient failures per this policy.
    pub(crate) async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, OpenFoodError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OpenFoodError>>,
    {
        let mut retry = 0u32;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if retry >= self.max_retries || !is_retriable(&err) {
                return Err(err);
            }
            retry += 1;
            let delay = self.delay_for(retry, 0.75 + rand::random::<f64>() * 0.5);
            tracing::warn!(
                retry,
                max_retries = self.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "Open Food Facts request failed transiently; backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
