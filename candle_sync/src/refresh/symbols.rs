use std::sync::Arc;

use market_data_ingestor::providers::DataProvider;
use tracing::{error, info, warn};

use crate::cache::SnapshotCache;

/// What one identifier refresh did to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolRefresh {
    /// The upstream answered with `n` symbols and they were published.
    Updated(usize),
    /// The upstream answered with no symbols; the cache was left alone.
    Empty,
    /// The upstream failed and the last good list (`n` symbols) was republished.
    Fallback(usize),
    /// The upstream failed and there was no earlier list to fall back on.
    Failed,
}

/// Keeps the cache's symbol list in step with the upstream universe.
///
/// Owns a copy of the last list it published so a failed lookup can fall back
/// to it.
pub struct SymbolRefresher {
    provider: Arc<dyn DataProvider>,
    cache: Arc<SnapshotCache>,
    fallback: Option<Vec<String>>,
}

impl SymbolRefresher {
    pub fn new(provider: Arc<dyn DataProvider>, cache: Arc<SnapshotCache>) -> Self {
        Self {
            provider,
            cache,
            fallback: None,
        }
    }

    pub async fn refresh(&mut self) -> SymbolRefresh {
        match self.provider.fetch_universe().await {
            Ok(symbols) if symbols.is_empty() => {
                warn!("upstream returned an empty universe, keeping the current symbol list");
                SymbolRefresh::Empty
            }
            Ok(symbols) => {
                let count = symbols.len();
                self.cache.set_symbols(symbols.clone());
                self.fallback = Some(symbols);
                info!(count, "symbol list updated");
                SymbolRefresh::Updated(count)
            }
            Err(err) => match &self.fallback {
                Some(symbols) => {
                    let count = symbols.len();
                    self.cache.set_symbols(symbols.clone());
                    warn!(error = %err, count, "symbol lookup failed, using fallback list");
                    SymbolRefresh::Fallback(count)
                }
                None => {
                    error!(error = %err, "symbol lookup failed and no fallback list is available");
                    SymbolRefresh::Failed
                }
            },
        }
    }
}
