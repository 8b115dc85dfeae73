//! Helpers for callers driving scrollers from long-running tasks.

pub mod retry;

pub use retry::{RetryConfig, load_next_page, with_retry};
