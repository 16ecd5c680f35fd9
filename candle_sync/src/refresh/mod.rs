//! The two refresh routines: the symbol list and the per-symbol candles.

pub mod candles;
pub mod symbols;

pub use candles::{CandleRefresher, CandleSettings, CycleReport};
pub use symbols::{SymbolRefresh, SymbolRefresher};
