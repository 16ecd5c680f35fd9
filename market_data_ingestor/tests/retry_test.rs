use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use market_data_ingestor::{
    models::{
        bar::Bar, bar_series::BarSeries, request_params::BarsRequestParams, timeframe::TimeFrame,
    },
    providers::{DataProvider, ProviderError},
    requests::historical::{
        BatchItemError, FetchWindow, RetryError, RetryPolicy, fetch_bars_batch_partial,
        fetch_bars_with_retry,
    },
};
use tokio::time::{Instant, sleep, timeout};

/// Fails the first `failures` calls for every symbol, then returns `bars` bars.
struct FlakyProvider {
    failures: usize,
    bars: usize,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl FlakyProvider {
    fn new(failures: usize, bars: usize) -> Self {
        Self {
            failures,
            bars,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_times(&self, symbol: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == symbol)
            .map(|(_, t)| *t)
            .collect()
    }
}

fn bar(ts: i64) -> Bar {
    Bar {
        timestamp: ts,
        open: 1.0,
        high: 2.0,
        low: 0.5,
        close: 1.5,
        volume: 3.0,
        trade_count: Some(1),
    }
}

#[async_trait]
impl DataProvider for FlakyProvider {
    async fn fetch_universe(&self) -> Result<Vec<String>, ProviderError> {
        Ok(vec![])
    }

    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError> {
        let seen = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((params.symbol.clone(), Instant::now()));
            calls.iter().filter(|(s, _)| *s == params.symbol).count()
        };
        if seen <= self.failures {
            return Err(ProviderError::Api {
                status: 429,
                message: format!("rate limited ({seen})"),
            });
        }
        let bars = (0..self.bars as i64).map(bar).collect();
        Ok(BarSeries::new(params.symbol.clone(), params.timeframe, bars))
    }
}

fn params(symbol: &str) -> BarsRequestParams {
    BarsRequestParams::lookback(symbol, TimeFrame::default(), Utc::now(), ChronoDuration::days(7))
}

#[tokio::test(start_paused = true)]
async fn fail_twice_then_succeed_sleeps_one_then_two_units() {
    let provider = FlakyProvider::new(2, 4);
    let started = Instant::now();

    let series = fetch_bars_with_retry(&provider, &params("BTC"), RetryPolicy::default())
        .await
        .expect("third attempt succeeds");

    assert_eq!(series.bars.len(), 4);
    let times = provider.call_times("BTC");
    assert_eq!(times.len(), 3);
    assert_eq!(times[1] - times[0], Duration::from_secs(1));
    assert_eq!(times[2] - times[1], Duration::from_secs(2));
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn always_failing_gives_up_after_max_attempts() {
    let provider = FlakyProvider::new(usize::MAX, 0);
    let started = Instant::now();

    let err = fetch_bars_with_retry(&provider, &params("ETH"), RetryPolicy::default())
        .await
        .unwrap_err();

    let RetryError::Exhausted { attempts, source } = err;
    assert_eq!(attempts, 3);
    assert!(matches!(source, ProviderError::Api { status: 429, .. }));
    assert_eq!(provider.call_times("ETH").len(), 3);
    // No sleep after the final attempt.
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn first_success_returns_without_sleeping() {
    let provider = FlakyProvider::new(0, 1);
    let started = Instant::now();

    fetch_bars_with_retry(&provider, &params("SOL"), RetryPolicy::default())
        .await
        .unwrap();

    assert_eq!(provider.call_times("SOL").len(), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn custom_time_unit_scales_backoff() {
    let provider = FlakyProvider::new(3, 1);
    let policy = RetryPolicy {
        max_attempts: 4,
        base_delay: Duration::from_millis(100),
    };

    fetch_bars_with_retry(&provider, &params("BTC"), policy)
        .await
        .unwrap();

    let times = provider.call_times("BTC");
    let gaps: Vec<Duration> = times.windows(2).map(|w| w[1] - w[0]).collect();
    assert_eq!(
        gaps,
        vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(400)
        ]
    );
}

/// Succeeds for every symbol except `bad`, which always fails.
struct OneBadSymbol {
    bad: &'static str,
    attempts: AtomicUsize,
}

#[async_trait]
impl DataProvider for OneBadSymbol {
    async fn fetch_universe(&self) -> Result<Vec<String>, ProviderError> {
        Ok(vec![])
    }

    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError> {
        if params.symbol == self.bad {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            return Err(ProviderError::Decode("truncated body".into()));
        }
        Ok(BarSeries::new(params.symbol.clone(), params.timeframe, vec![bar(0)]))
    }
}

#[tokio::test(start_paused = true)]
async fn batch_backoff_is_per_symbol_and_outcomes_keep_input_order() {
    let provider = Arc::new(OneBadSymbol {
        bad: "ETH",
        attempts: AtomicUsize::new(0),
    });
    let now = Utc::now();
    let window = FetchWindow {
        timeframe: TimeFrame::default(),
        start: now - ChronoDuration::days(1),
        end: now,
    };
    let batch = vec!["BTC".to_string(), "ETH".to_string(), "SOL".to_string()];
    let started = Instant::now();

    let outcomes =
        fetch_bars_batch_partial(provider.clone(), &batch, window, RetryPolicy::default()).await;

    let symbols: Vec<&str> = outcomes.iter().map(|o| o.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BTC", "ETH", "SOL"]);
    assert!(outcomes[0].result.is_ok());
    assert!(matches!(outcomes[1].result, Err(BatchItemError::Retry(_))));
    assert!(outcomes[2].result.is_ok());
    assert_eq!(provider.attempts.load(Ordering::SeqCst), 3);
    // The batch waits for its slowest member, and only for it.
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn dropping_a_batch_aborts_its_pending_retries() {
    let provider = Arc::new(OneBadSymbol {
        bad: "SLOW",
        attempts: AtomicUsize::new(0),
    });
    let now = Utc::now();
    let window = FetchWindow {
        timeframe: TimeFrame::default(),
        start: now - ChronoDuration::days(1),
        end: now,
    };
    let batch = vec!["SLOW".to_string()];

    // Give up while the first backoff sleep is still pending.
    let cut_short = timeout(
        Duration::from_millis(500),
        fetch_bars_batch_partial(provider.clone(), &batch, window, RetryPolicy::default()),
    )
    .await;
    assert!(cut_short.is_err());
    assert_eq!(provider.attempts.load(Ordering::SeqCst), 1);

    sleep(Duration::from_secs(10)).await;
    assert_eq!(provider.attempts.load(Ordering::SeqCst), 1);
}
