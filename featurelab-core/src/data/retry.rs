//! Opt-in retry wrapper for any provider.
//!
//! Providers themselves make exactly one attempt. Wrapping one in
//! `RetryingProvider` retries transient failures (network, rate limit, 5xx)
//! with exponential backoff, waiting at least as long as a rate-limit response
//! asks. Every other error and every successful result, including an empty
//! one, is returned as-is.

use super::provider::{DataError, DataProvider, FetchRequest, FetchResult};
use std::time::Duration;
use tracing::warn;

pub struct RetryingProvider<P> {
    inner: P,
    max_retries: u32,
    base_delay: Duration,
}

impl<P: DataProvider> RetryingProvider<P> {
    pub fn new(inner: P, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
        }
    }

    /// Delay before retry number `attempt` (1-based): base * 2^(attempt-1).
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }

    /// Backoff for `attempt`, stretched to the server's `Retry-After` when rate limited.
    fn delay_for(&self, attempt: u32, err: &DataError) -> Duration {
        let backoff = self.backoff(attempt);
        match err {
            DataError::RateLimited { retry_after_secs } => {
                backoff.max(Duration::from_secs(*retry_after_secs))
            }
            _ => backoff,
        }
    }
}

impl<P: DataProvider> DataProvider for RetryingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, DataError> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch(request) {
                Ok(result) => return Ok(result),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.delay_for(attempt, &err);
                    warn!(
                        ticker = %request.ticker,
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "fetch failed, retrying"
                    );
                    std::thread::sleep(delay);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
