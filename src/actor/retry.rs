//! Caller-side retry for pagination calls with exponential backoff.
//!
//! The scroller itself never retries. Callers that want retry semantics wrap
//! `next_page`/`reload` with [`with_retry`], or use [`load_next_page`], which
//! also recovers from a filter change that lands mid-fetch.

use std::future::Future;
use std::time::Duration;

use crate::constants::{INITIAL_RETRY_DELAY_MS, MAX_RETRIES, MAX_RETRY_DELAY_SECS};
use crate::error::PaginationError;
use crate::scroll::{ListScroller, MailboxBackend};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            initial_delay: Duration::from_millis(INITIAL_RETRY_DELAY_MS),
            max_delay: Duration::from_secs(MAX_RETRY_DELAY_SECS),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
        }
    }
}

/// Run a pagination operation, retrying transient failures.
///
/// Errors for which [`PaginationError::is_transient`] is false, such as
/// `PaginatorAlreadyTerminated`, are returned on the first occurrence.
pub async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, PaginationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PaginationError>>,
{
    let mut attempts = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) => {
                attempts += 1;
                if attempts > config.max_retries {
                    return Err(e);
                }

                tracing::warn!(
                    "Pagination failed (attempt {}/{}): {}. Retrying in {:?}...",
                    attempts,
                    config.max_retries + 1,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;

                delay = (delay * 2).min(config.max_delay);
            }
        }
    }
}

/// Grow the scroller's window by one page, retrying transient failures.
///
/// A fetch that raced a filter change has already grown the window under
/// mixed filters, so instead of fetching again the window is rebuilt once
/// with `reload` under the filters now in effect.
pub async fn load_next_page<B: MailboxBackend>(
    scroller: &ListScroller<B>,
    config: &RetryConfig,
) -> Result<(), PaginationError> {
    match with_retry(config, || scroller.next_page()).await {
        Err(PaginationError::StaleFilters) => {
            tracing::info!(
                "Filters of {} changed during fetch, reloading",
                scroller.handle()
            );
            with_retry(config, || scroller.reload()).await
        }
        result => result,
    }
}
