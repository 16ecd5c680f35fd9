//! In-memory snapshot of the latest candles and the active symbol list.
//!
//! The symbol list is a read-mostly value that is replaced wholesale, so it
//! lives behind an `ArcSwap`: readers take one atomic load and always see
//! either the previous list or the new one. Series entries are keyed per
//! symbol and replaced one at a time under a `RwLock`; each entry is an
//! immutable `Arc<SeriesEntry>`, so a reader never observes a half-written
//! series and concurrent readers do not block each other.
//!
//! Both "last updated" timestamps start at the Unix epoch and only move
//! forward.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use market_data_ingestor::models::bar::Bar;
use serde::Serialize;

/// The latest bars stored for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesEntry {
    pub symbol: String,
    #[serde(rename = "candles")]
    pub bars: Vec<Bar>,
    pub last_update: DateTime<Utc>,
}

/// The active symbol list and when it was last replaced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolList {
    pub symbols: Vec<String>,
    pub last_fetch: DateTime<Utc>,
}

impl Default for SymbolList {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            last_fetch: DateTime::UNIX_EPOCH,
        }
    }
}

#[derive(Debug)]
struct SeriesTable {
    entries: HashMap<String, Arc<SeriesEntry>>,
    updated_at: DateTime<Utc>,
}

/// Shared cache handed to the refresh loops and the read API as `Arc<SnapshotCache>`.
#[derive(Debug)]
pub struct SnapshotCache {
    symbols: ArcSwap<SymbolList>,
    series: RwLock<SeriesTable>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCache {
    /// Creates an empty cache: no symbols, no series, both timestamps at the epoch.
    pub fn new() -> Self {
        Self {
            symbols: ArcSwap::from_pointee(SymbolList::default()),
            series: RwLock::new(SeriesTable {
                entries: HashMap::new(),
                updated_at: DateTime::UNIX_EPOCH,
            }),
        }
    }

    /// Replaces the entry for `symbol` with `bars`, stamped with the current time.
    ///
    /// An empty `bars` is stored as-is; it overwrites whatever was there.
    pub fn set_series(&self, symbol: impl Into<String>, bars: Vec<Bar>) {
        let mut table = self.series.write().unwrap_or_else(PoisonError::into_inner);
        let now = table.updated_at.max(Utc::now());
        let symbol = symbol.into();

        table.entries.insert(
            symbol.clone(),
            Arc::new(SeriesEntry {
                symbol,
                bars,
                last_update: now,
            }),
        );
        table.updated_at = now;
    }

    /// The entry for `symbol`, or `None` if it was never written.
    pub fn get_series(&self, symbol: &str) -> Option<Arc<SeriesEntry>> {
        let table = self.series.read().unwrap_or_else(PoisonError::into_inner);
        table.entries.get(symbol).cloned()
    }

    /// A fresh map of every entry. Changing the map does not touch the cache.
    pub fn get_all_series(&self) -> HashMap<String, Arc<SeriesEntry>> {
        let table = self.series.read().unwrap_or_else(PoisonError::into_inner);
        table.entries.clone()
    }

    /// Replaces the active symbol list and stamps it with the current time.
    pub fn set_symbols(&self, symbols: Vec<String>) {
        self.symbols.rcu(|prev| SymbolList {
            symbols: symbols.clone(),
            last_fetch: prev.last_fetch.max(Utc::now()),
        });
    }

    /// An owned copy of the active symbol list.
    pub fn get_symbols(&self) -> Vec<String> {
        self.symbols.load().symbols.clone()
    }

    /// The active symbol list as one atomic snapshot.
    pub fn symbols_snapshot(&self) -> Arc<SymbolList> {
        self.symbols.load_full()
    }

    /// When any series was last written.
    pub fn data_updated_at(&self) -> DateTime<Utc> {
        self.series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .updated_at
    }

    /// When the symbol list was last replaced.
    pub fn symbols_updated_at(&self) -> DateTime<Utc> {
        self.symbols.load().last_fetch
    }
}
