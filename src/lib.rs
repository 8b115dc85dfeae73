//! Cursor and pagination engine for scrollable, filterable mailbox lists.
//!
//! A [`ListScroller`](scroll::ListScroller) owns a paginated view over one
//! backend collection and hands out [`Cursor`](scroll::Cursor)s that resolve
//! neighbouring items locally when they can and asynchronously when they must.

pub mod actor;
pub mod config;
pub mod constants;
pub mod error;
pub mod mail;
pub mod scroll;

pub use error::{BackendError, PaginationError};
