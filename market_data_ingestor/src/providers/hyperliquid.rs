//! Hyperliquid `info` endpoint: perpetual universe discovery and candle snapshots.

pub mod params;
pub mod provider;
pub mod response;

pub use provider::{BASE_URL, HyperliquidProvider};
