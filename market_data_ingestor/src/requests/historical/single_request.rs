use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

use crate::{
    models::{bar_series::BarSeries, request_params::BarsRequestParams},
    providers::{DataProvider, ProviderError},
};

/// Bounded retry with pure exponential backoff (no jitter, no cap).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles after each further failure.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt `attempt` (0-based): `base * 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// A symbol whose fetch failed on every attempt.
#[derive(Debug, Error)]
pub enum RetryError {
    #[error("failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: ProviderError,
    },
}

/// Fetches one window, retrying failures according to `policy`.
///
/// The backoff sleep suspends only the calling task, so sibling fetches in the
/// same batch keep running. The last underlying error is kept in
/// [`RetryError::Exhausted`]; deciding what to store for the symbol is the
/// caller's job.
pub async fn fetch_bars_with_retry<P>(
    provider: &P,
    params: &BarsRequestParams,
    policy: RetryPolicy,
) -> Result<BarSeries, RetryError>
where
    P: DataProvider + ?Sized,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match provider.fetch_bars(params).await {
            Ok(series) => return Ok(series),
            Err(source) => {
                if attempt + 1 >= attempts {
                    return Err(RetryError::Exhausted { attempts, source });
                }
                let delay = policy.backoff(attempt);
                debug!(
                    symbol = %params.symbol,
                    attempt = attempt + 1,
                    ?delay,
                    error = %source,
                    "fetch failed, backing off"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_from_the_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        let policy = RetryPolicy {
            max_attempts: 100,
            base_delay: Duration::from_millis(10),
        };
        assert!(policy.backoff(64) >= policy.backoff(31));
    }
}
