//! Tuning constants and defaults
//!
//! Centralizes magic numbers to make them discoverable and configurable.

/// Number of items the in-memory mailbox materializes per page.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Initial delay before the first retry of a transient pagination failure.
pub const INITIAL_RETRY_DELAY_MS: u64 = 500;

/// Maximum retry delay in seconds.
pub const MAX_RETRY_DELAY_SECS: u64 = 30;

/// Maximum number of retry attempts after the first failure.
pub const MAX_RETRIES: u32 = 3;

/// Pages the CLI materializes when `--pages` is not given.
pub const DEFAULT_BROWSE_PAGES: usize = 2;

/// Steps the CLI walks when `--steps` is not given.
pub const DEFAULT_WALK_STEPS: usize = 10;

/// Date format for item listings.
pub const DATE_FORMAT: &str = "%b %d %H:%M";
