use super::PageFetchError;
use core::time::Duration;

const LOG_TARGET: &str = "     retry";

/// Upper bound on any single backoff delay.
const MAX_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Every retry waits the base delay.
    Fixed,

    /// Retry `n` waits `base * 2^(n-1)`.
    Exponential,
}

/// How a page task retries transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries on top of the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
}

/// The final result of running an operation under a [`RetryPolicy`].
#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub result: Result<T, PageFetchError>,
    pub attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            backoff: Backoff::Exponential,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            backoff: Backoff::Fixed,
        }
    }

    /// The wait before retry number `retry` (1-based).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let delay = match self.backoff {
            Backoff::Fixed => self.base_delay,
            Backoff::Exponential => self.base_delay.saturating_mul(2u32.saturating_pow(retry.saturating_sub(1))),
        };

        delay.min(MAX_DELAY)
    }

    /// Run `operation` until it succeeds, fails permanently, or runs out of retries.
    ///
    /// `operation` receives the 1-based attempt number. A server-requested `Retry-After` is
    /// honored when it is longer than the computed delay; `on_retry_after` is told about it so
    /// the caller can hold back other work too.
    pub async fn execute<T, F, Fut>(&self, mut operation: F, on_retry_after: impl Fn(Duration)) -> RetryOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, PageFetchError>>,
    {
        let mut attempt = 1;
        loop {
            let result = operation(attempt).await;
            let error = match result {
                Ok(value) => {
                    return RetryOutcome {
                        result: Ok(value),
                        attempts: attempt,
                    };
                }
                Err(error) => error,
            };

            if !error.is_transient() || attempt > self.max_retries {
                return RetryOutcome {
                    result: Err(error),
                    attempts: attempt,
                };
            }

            let mut delay = self.delay_for(attempt);
            if let Some(requested) = error.retry_after() {
                on_retry_after(requested);
                delay = delay.max(requested.min(MAX_DELAY));
            }

            log::debug!(
                target: LOG_TARGET,
                "Retrying after {error} (attempt {}, delay {}ms)",
                attempt + 1,
                delay.as_millis()
            );

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
