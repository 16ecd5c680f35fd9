#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use candle_sync::{
    cache::SnapshotCache,
    refresh::{CandleRefresher, CandleSettings},
};
use market_data_ingestor::{
    models::{
        bar::Bar, bar_series::BarSeries, request_params::BarsRequestParams, timeframe::TimeFrame,
    },
    providers::{DataProvider, ProviderError},
    requests::historical::RetryPolicy,
};
use tokio::time::Instant;

/// In-memory upstream whose answers are set up by each test.
///
/// Symbols listed in `bars` return that many bars; every other symbol fails on
/// every attempt.
#[derive(Default)]
pub struct ScriptedProvider {
    universe: Mutex<Option<Vec<String>>>,
    bars: Mutex<HashMap<String, usize>>,
    universe_calls: AtomicUsize,
    fetches: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_universe(self: Arc<Self>, symbols: &[&str]) -> Arc<Self> {
        self.set_universe(symbols);
        self
    }

    pub fn with_bars(self: Arc<Self>, symbol: &str, count: usize) -> Arc<Self> {
        self.bars.lock().unwrap().insert(symbol.to_string(), count);
        self
    }

    pub fn set_universe(&self, symbols: &[&str]) {
        *self.universe.lock().unwrap() = Some(symbols.iter().map(|s| s.to_string()).collect());
    }

    /// Makes every following universe call fail.
    pub fn fail_universe(&self) {
        *self.universe.lock().unwrap() = None;
    }

    pub fn universe_calls(&self) -> usize {
        self.universe_calls.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> Vec<(String, Instant)> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, symbol: &str) -> usize {
        self.fetches().iter().filter(|(s, _)| s == symbol).count()
    }
}

pub fn bar(ts: i64) -> Bar {
    Bar {
        timestamp: ts,
        open: 10.0,
        high: 12.0,
        low: 9.0,
        close: 11.0,
        volume: 100.0,
        trade_count: Some(4),
    }
}

#[async_trait]
impl DataProvider for ScriptedProvider {
    async fn fetch_universe(&self) -> Result<Vec<String>, ProviderError> {
        self.universe_calls.fetch_add(1, Ordering::SeqCst);
        self.universe
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ProviderError::Api {
                status: 500,
                message: "meta unavailable".into(),
            })
    }

    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError> {
        self.fetches
            .lock()
            .unwrap()
            .push((params.symbol.clone(), Instant::now()));

        let count = self.bars.lock().unwrap().get(&params.symbol).copied();
        match count {
            Some(n) => {
                let bars = (0..n as i64).map(|i| bar(1_700_000_000_000 + i * 3_600_000)).collect();
                Ok(BarSeries::new(params.symbol.clone(), params.timeframe, bars))
            }
            None => Err(ProviderError::Api {
                status: 502,
                message: format!("no candles for {}", params.symbol),
            }),
        }
    }
}

pub fn settings(batch_size: usize, batch_delay: Duration) -> CandleSettings {
    CandleSettings {
        timeframe: TimeFrame::default(),
        lookback: chrono::Duration::days(7),
        batch_size,
        batch_delay,
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        },
    }
}

pub fn candle_refresher(
    provider: &Arc<ScriptedProvider>,
    cache: &Arc<SnapshotCache>,
    settings: CandleSettings,
) -> CandleRefresher {
    let provider: Arc<dyn DataProvider> = provider.clone();
    CandleRefresher::new(provider, Arc::clone(cache), settings)
}
