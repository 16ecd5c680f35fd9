use std::{sync::Arc, time::Duration};

use chrono::Utc;
use market_data_ingestor::{
    models::timeframe::TimeFrame,
    providers::DataProvider,
    requests::historical::{FetchWindow, RetryPolicy, batch_count, fetch_bars_batch_partial, partition},
};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::cache::SnapshotCache;

/// Knobs for one data refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleSettings {
    pub timeframe: TimeFrame,
    pub lookback: chrono::Duration,
    pub batch_size: usize,
    /// Pause between consecutive batches; none after the last one.
    pub batch_delay: Duration,
    pub retry: RetryPolicy,
}

impl Default for CandleSettings {
    fn default() -> Self {
        Self {
            timeframe: TimeFrame::default(),
            lookback: chrono::Duration::days(7),
            batch_size: 10,
            batch_delay: Duration::from_millis(200),
            retry: RetryPolicy::default(),
        }
    }
}

/// Totals for one data refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub symbols: usize,
    pub batches: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl CycleReport {
    /// A cycle that found no symbols and did nothing.
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn is_skipped(&self) -> bool {
        self.symbols == 0
    }
}

/// Fetches bars for every active symbol in ordered, bounded batches.
pub struct CandleRefresher {
    provider: Arc<dyn DataProvider>,
    cache: Arc<SnapshotCache>,
    settings: CandleSettings,
}

impl CandleRefresher {
    pub fn new(
        provider: Arc<dyn DataProvider>,
        cache: Arc<SnapshotCache>,
        settings: CandleSettings,
    ) -> Self {
        Self {
            provider,
            cache,
            settings,
        }
    }

    /// Runs one full refresh cycle over the current symbol list.
    ///
    /// Each batch is a barrier: all of its fetches run concurrently and every
    /// one of them finishes before the next batch starts. A symbol whose fetch
    /// fails terminally is overwritten with an empty series.
    pub async fn run_cycle(&self) -> CycleReport {
        let snapshot = self.cache.symbols_snapshot();
        let symbols = &snapshot.symbols;
        if symbols.is_empty() {
            warn!("no symbols to refresh, skipping candle cycle");
            return CycleReport::skipped();
        }

        let end = Utc::now();
        let window = FetchWindow {
            timeframe: self.settings.timeframe,
            start: end - self.settings.lookback,
            end,
        };
        let total = batch_count(symbols.len(), self.settings.batch_size);
        let mut report = CycleReport {
            symbols: symbols.len(),
            batches: total,
            ..CycleReport::default()
        };

        info!(
            symbols = symbols.len(),
            batches = total,
            timeframe = %window.timeframe,
            "starting candle cycle"
        );

        for (index, batch) in partition(symbols, self.settings.batch_size).enumerate() {
            let outcomes = fetch_bars_batch_partial(
                Arc::clone(&self.provider),
                batch,
                window,
                self.settings.retry,
            )
            .await;

            let mut batch_ok = 0;
            for outcome in outcomes {
                match outcome.result {
                    Ok(series) => {
                        self.cache.set_series(outcome.symbol, series.bars);
                        batch_ok += 1;
                    }
                    Err(err) => {
                        error!(symbol = %outcome.symbol, error = %err, "giving up on symbol, storing empty series");
                        self.cache.set_series(outcome.symbol, Vec::new());
                        report.failed += 1;
                    }
                }
            }
            report.succeeded += batch_ok;

            info!(
                batch = index + 1,
                of = total,
                ok = batch_ok,
                size = batch.len(),
                "batch complete"
            );

            if index + 1 < total && !self.settings.batch_delay.is_zero() {
                sleep(self.settings.batch_delay).await;
            }
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "candle cycle complete"
        );
        report
    }
}
