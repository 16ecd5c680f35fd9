//! Periodic drivers for the two refresh routines.
//!
//! Each routine runs on its own spawned task with its own interval, so a slow
//! candle cycle never holds up the symbol refresh. Ticks missed while a cycle
//! is still running are delayed, not replayed in a burst.

use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, info};

use crate::refresh::{CandleRefresher, SymbolRefresher};

/// Runs `refresher` at `start` and then every `period`.
pub fn spawn_symbol_loop(
    mut refresher: SymbolRefresher,
    start: Instant,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let outcome = refresher.refresh().await;
            debug!(?outcome, "symbol refresh finished");
        }
    })
}

/// Runs a candle cycle at `start` and then every `period`.
pub fn spawn_candle_loop(refresher: CandleRefresher, start: Instant, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let report = refresher.run_cycle().await;
            debug!(?report, "candle cycle finished");
        }
    })
}

/// Handle to the running refresh loops.
#[derive(Debug)]
pub struct Scheduler {
    symbols: JoinHandle<()>,
    candles: JoinHandle<()>,
}

impl Scheduler {
    /// Primes the symbol list once, then starts both loops.
    ///
    /// The first candle cycle runs right away against the primed list; the
    /// next symbol refresh happens one `symbol_period` later.
    pub async fn start(
        mut symbols: SymbolRefresher,
        candles: CandleRefresher,
        symbol_period: Duration,
        candle_period: Duration,
    ) -> Self {
        let outcome = symbols.refresh().await;
        info!(
            ?outcome,
            symbol_every = ?symbol_period,
            candle_every = ?candle_period,
            "starting refresh loops"
        );

        let now = Instant::now();
        Self {
            symbols: spawn_symbol_loop(symbols, now + symbol_period, symbol_period),
            candles: spawn_candle_loop(candles, now, candle_period),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.symbols.is_finished() && !self.candles.is_finished()
    }

    /// Stops both loops. A cycle in flight is dropped, not drained.
    pub fn shutdown(self) {
        self.symbols.abort();
        self.candles.abort();
        info!("refresh loops stopped");
    }
}
