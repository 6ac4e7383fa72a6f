use std::{future::Future, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio_retry::{Retry, strategy::ExponentialBackoff, strategy::jitter};

use crate::models::{Currency, PriceHistory, RateHistory, SplitEvent, Symbol};

const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

#[async_trait]
pub trait SplitProvider: Send + Sync {
    /// Every split of `symbol`, in any order. An empty list means no splits.
    async fn splits(&self, symbol: &Symbol, currency: Currency) -> Result<Vec<SplitEvent>>;
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Sparse history of base units per one unit of `currency` over `start..=end`.
    async fn rates(
        &self,
        currency: Currency,
        base: Currency,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RateHistory>;
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Daily closes of `symbol` in its listing currency over `start..=end`.
    async fn history(
        &self,
        symbol: &Symbol,
        currency: Currency,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceHistory>;
}

/// Exponential backoff starting at `base_delay_ms`, doubling per attempt.
pub fn backoff(retries: usize, base_delay_ms: u64) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(base_delay_ms / 2)
        .max_delay(MAX_RETRY_DELAY)
        .map(jitter)
        .take(retries)
}

/// Runs `action` once plus at most `retries` more times.
pub async fn fetch_with_retry<T, A, F>(
    what: &str,
    retries: usize,
    base_delay_ms: u64,
    mut action: A,
) -> Result<T>
where
    A: FnMut() -> F,
    F: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    Retry::spawn(backoff(retries, base_delay_ms), || {
        attempt += 1;
        if attempt > 1 {
            log::debug!("Retrying {} (attempt {})", what, attempt);
        }
        action()
    })
    .await
    .with_context(|| format!("Failed to fetch {} after {} attempt(s)", what, retries + 1))
}
