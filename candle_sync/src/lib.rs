//! Periodic candle snapshot service.
//!
//! Two background loops keep a [`cache::SnapshotCache`] current: one replaces
//! the list of tradable symbols, the other fetches recent bars for every
//! symbol in bounded, ordered batches. The [`api`] module serves whatever the
//! cache holds at the moment of the request.

pub mod api;
pub mod cache;
pub mod config;
pub mod refresh;
pub mod scheduler;
