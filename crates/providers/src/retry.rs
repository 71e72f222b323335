//! Retry policy for requests to external services.

use std::{future::Future, time::Duration};

/// The retry policy applied to the transient failures of an external request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retry {
    /// Maximum number of retries after the first attempt. None means infinite retries.
    pub max_retries: Option<usize>,
    /// Delay before the first retry in milliseconds.
    pub initial_delay_ms: u64,
    /// Whether the delay doubles after each retry.
    pub exponential_backoff: bool,
}

impl Default for Retry {
    fn default() -> Self {
        Self { max_retries: None, initial_delay_ms: 50, exponential_backoff: false }
    }
}

impl Retry {
    /// Creates a new [`Retry`] with the specified parameters.
    pub const fn new(
        max_retries: Option<usize>,
        initial_delay_ms: u64,
        exponential_backoff: bool,
    ) -> Self {
        Self { max_retries, initial_delay_ms, exponential_backoff }
    }

    /// Returns a [`Retry`] making exactly `attempts` attempts with a fixed delay.
    pub const fn fixed(attempts: usize, delay: Duration) -> Self {
        Self {
            max_retries: Some(attempts.saturating_sub(1)),
            initial_delay_ms: delay.as_millis() as u64,
            exponential_backoff: false,
        }
    }

    /// Returns the delay before the provided retry, numbered from one.
    pub fn delay(&self, retry: usize) -> Duration {
        let factor =
            if self.exponential_backoff { 1u64 << retry.saturating_sub(1).min(16) } else { 1 };
        Duration::from_millis(self.initial_delay_ms.saturating_mul(factor))
    }

    /// Runs the operation until it succeeds, fails with an error rejected by `should_retry` or
    /// runs out of retries. Returns the last error in the two latter cases.
    pub async fn retry_if<F, Fut, T, E>(
        &self,
        operation_name: &str,
        operation: F,
        should_retry: impl Fn(&E) -> bool,
    ) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Debug,
    {
        let mut retries = 0;
        loop {
            let error = match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => error,
            };
            if !should_retry(&error) || self.max_retries.is_some_and(|max| retries >= max) {
                return Err(error);
            }

            retries += 1;
            tracing::warn!(target: "rollup::providers", operation = operation_name, ?error, retries, "retrying request");
            tokio::time::sleep(self.delay(retries)).await;
        }
    }
}
