// SPDX-License-Identifier: MIT

//! Retry with exponential backoff for transient model failures

use crate::adk::error::ModelError;
use std::future::Future;
use std::time::Duration;

/// Upper bound on a server-requested `Retry-After` wait
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Retry policy for model calls
///
/// Only errors with [`ModelError::is_transient`] are retried; validation and
/// configuration failures are returned on the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_millis(500),
        }
    }

    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before retry number `attempt` (0-based)
    fn delay_for(&self, attempt: u32, err: &ModelError) -> Duration {
        if let ModelError::RateLimited {
            retry_after_secs: Some(secs),
        } = err
        {
            return Duration::from_secs(*secs).min(MAX_RETRY_AFTER);
        }
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `op` until it succeeds, fails permanently or retries run out
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, ModelError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ModelError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt, &err);
                    log::warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        label,
                        attempt + 1,
                        self.max_retries + 1,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
