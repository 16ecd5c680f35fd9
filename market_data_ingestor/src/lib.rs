//! Upstream market-data access: the canonical bar model, the [`DataProvider`]
//! abstraction with its Hyperliquid implementation, and the retrying / batched
//! request helpers built on top of it.
//!
//! [`DataProvider`]: providers::DataProvider

pub mod models;
pub mod providers;
pub mod requests;
