//! Incremental list cursor and pagination engine.
//!
//! - `types.rs` - Item identity, collection handle, filter axes, result enums
//! - `backend.rs` - Contract the engine needs from the backend collection
//! - `cursor.rs` - Single-position cursor with two-tier next resolution
//! - `scroller.rs` - Filterable paginated view that issues cursors
//! - `memory.rs` - In-memory backend used by the CLI and tests

mod backend;
mod cursor;
mod memory;
mod scroller;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::MailboxBackend;
pub use cursor::Cursor;
pub use memory::MemoryMailbox;
pub use scroller::ListScroller;
pub use types::{
    CollectionHandle, CursorResult, FilterState, IncludeSwitch, ItemId, PeekNext, ReadFilter,
};
