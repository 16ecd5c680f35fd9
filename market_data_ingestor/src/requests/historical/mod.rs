//! Policy layered over a single [`DataProvider`](crate::providers::DataProvider) call:
//! per-symbol retry with exponential backoff, and bounded fan-out over a batch
//! of symbols.

mod single_request;
pub use single_request::{RetryError, RetryPolicy, fetch_bars_with_retry};

mod batch_request;
pub use batch_request::{
    BatchItemError, BatchOutcome, FetchWindow, batch_count, fetch_bars_batch_partial, partition,
};
