//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, the single seam between the
//! refresh pipeline and any upstream vendor. A provider answers two questions:
//! which symbols currently exist ([`DataProvider::fetch_universe`]) and what the
//! bars for one symbol over one window look like ([`DataProvider::fetch_bars`]).
//!
//! Each call is a single upstream round-trip. Retrying and batching are layered
//! on top in [`crate::requests`], so implementations stay free of policy.
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`Arc<dyn DataProvider>`), which is how the scheduler holds it.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::{bar_series::BarSeries, request_params::BarsRequestParams};
//! use market_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_universe(&self) -> Result<Vec<String>, ProviderError> {
//!         Ok(vec!["BTC".to_string()])
//!     }
//!
//!     async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError> {
//!         Ok(BarSeries::new(params.symbol.clone(), params.timeframe, vec![]))
//!     }
//! }
//! ```

pub mod hyperliquid;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{bar_series::BarSeries, request_params::BarsRequestParams};

/// Trait for fetching symbols and time-series bar data from a market data provider.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetches the currently tradable symbols, in upstream order.
    ///
    /// Delisted entries and entries without a name are excluded.
    async fn fetch_universe(&self) -> Result<Vec<String>, ProviderError>;

    /// Fetches the bars for one symbol over one inclusive time window.
    ///
    /// # Returns
    ///
    /// * `Ok(BarSeries)` - The bars in upstream order; possibly empty.
    /// * `Err(ProviderError)` - Transport failure, non-success status, or a
    ///   payload that could not be decoded.
    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance.
#[derive(Debug, Error)]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    /// API key contains invalid characters.
    #[error("Invalid API key format: {0}")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),
}

/// Errors that can occur within a `DataProvider` implementation.
///
/// Every variant is scoped to a single upstream call and is recoverable by the
/// caller, either by retrying or by recording a per-symbol failure.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider's API answered with a non-success status.
    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The request parameters were invalid for this specific provider.
    #[error("Invalid parameters for provider: {0}")]
    Validation(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Decode(err.to_string())
    }
}
