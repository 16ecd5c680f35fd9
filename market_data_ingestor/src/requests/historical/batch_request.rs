use std::{slice::Chunks, sync::Arc};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};

use crate::{
    models::{bar_series::BarSeries, request_params::BarsRequestParams, timeframe::TimeFrame},
    providers::DataProvider,
    requests::historical::{RetryError, RetryPolicy, fetch_bars_with_retry},
};

/// The shared part of every request in one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchWindow {
    pub timeframe: TimeFrame,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl FetchWindow {
    pub fn params_for(&self, symbol: &str) -> BarsRequestParams {
        BarsRequestParams {
            symbol: symbol.to_string(),
            timeframe: self.timeframe,
            start: self.start,
            end: self.end,
        }
    }
}

/// Why one symbol of a batch produced no data.
#[derive(Debug, Error)]
pub enum BatchItemError {
    #[error(transparent)]
    Retry(#[from] RetryError),

    #[error("fetch task did not complete: {0}")]
    Join(#[from] JoinError),
}

/// The result for one symbol of a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub symbol: String,
    pub result: Result<BarSeries, BatchItemError>,
}

/// Splits `symbols` into consecutive batches of at most `batch_size`, in order.
///
/// A `batch_size` of zero is treated as one.
pub fn partition(symbols: &[String], batch_size: usize) -> Chunks<'_, String> {
    symbols.chunks(batch_size.max(1))
}

/// Number of batches [`partition`] yields: `ceil(len / batch_size)`.
pub fn batch_count(len: usize, batch_size: usize) -> usize {
    len.div_ceil(batch_size.max(1))
}

/// Fetches every symbol of one batch concurrently and waits for all of them.
///
/// One task is spawned per symbol before any is awaited; the call returns only
/// once every task has finished, so a batch acts as a barrier. Failures never
/// short-circuit the batch: each symbol gets its own [`BatchOutcome`], in input
/// order.
///
/// Dropping the returned future aborts every task still running, so a
/// cancelled cycle stops its retries instead of leaving them detached.
pub async fn fetch_bars_batch_partial(
    provider: Arc<dyn DataProvider>,
    batch: &[String],
    window: FetchWindow,
    policy: RetryPolicy,
) -> Vec<BatchOutcome> {
    let mut tasks = AbortOnDrop(
        batch
            .iter()
            .map(|symbol| {
                let provider = Arc::clone(&provider);
                let params = window.params_for(symbol);
                tokio::spawn(
                    async move { fetch_bars_with_retry(provider.as_ref(), &params, policy).await },
                )
            })
            .collect(),
    );

    join_all(tasks.0.iter_mut())
        .await
        .into_iter()
        .zip(batch)
        .map(|(joined, symbol)| BatchOutcome {
            symbol: symbol.clone(),
            result: match joined {
                Ok(fetched) => fetched.map_err(BatchItemError::from),
                Err(join_err) => Err(BatchItemError::from(join_err)),
            },
        })
        .collect()
}

struct AbortOnDrop(Vec<JoinHandle<Result<BarSeries, RetryError>>>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        // No-op for tasks that already finished.
        for handle in &self.0 {
            handle.abort();
        }
    }
}
