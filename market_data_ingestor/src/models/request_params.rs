use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::timeframe::TimeFrame;

/// Parameters for requesting one symbol's bars over one time window.
///
/// This struct is vendor-agnostic and is the standard input for
/// [`DataProvider::fetch_bars`](crate::providers::DataProvider::fetch_bars).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// Symbol to request (e.g. `"BTC"`).
    pub symbol: String,

    /// The bar width. Always one of the widths the upstream supports.
    pub timeframe: TimeFrame,

    /// Start of the requested time range (inclusive, UTC).
    pub start: DateTime<Utc>,

    /// End of the requested time range (inclusive, UTC).
    pub end: DateTime<Utc>,
}

impl BarsRequestParams {
    /// Builds a request for the window `[end - lookback, end]`.
    pub fn lookback(
        symbol: impl Into<String>,
        timeframe: TimeFrame,
        end: DateTime<Utc>,
        lookback: Duration,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            start: end - lookback,
            end,
        }
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }
}
