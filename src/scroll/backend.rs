//! Contract the engine requires from the backend collection engine.

use std::future::Future;

use crate::error::BackendError;

use super::types::{CollectionHandle, IncludeSwitch, ItemId, PeekNext, ReadFilter};

/// The backend that owns the authoritative item list.
///
/// Synchronous methods must answer from local state only and never block on
/// I/O. Asynchronous methods may hit the network; their timeout policy belongs
/// to the implementation.
pub trait MailboxBackend: Send + Sync + 'static {
    /// Best-effort local answer for the item after `position`.
    fn peek_next(&self, handle: &CollectionHandle, position: &ItemId) -> PeekNext;

    /// Local answer for the item before `position`.
    fn peek_prev(&self, handle: &CollectionHandle, position: &ItemId) -> Option<ItemId>;

    /// Resolve the item after `position`, fetching remote pages if needed.
    fn fetch_next(
        &self,
        handle: &CollectionHandle,
        position: &ItemId,
    ) -> impl Future<Output = Result<Option<ItemId>, BackendError>> + Send;

    fn apply_filter(&self, handle: &CollectionHandle, filter: ReadFilter);

    fn apply_include(&self, handle: &CollectionHandle, include: IncludeSwitch);

    /// Materialize one more page into the live collection.
    fn fetch_more(
        &self,
        handle: &CollectionHandle,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Re-materialize the current window under the current filters.
    fn refetch_all(
        &self,
        handle: &CollectionHandle,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Whether the collection can include spam and trash.
    fn query_include_capability(
        &self,
        handle: &CollectionHandle,
    ) -> impl Future<Output = Result<bool, BackendError>> + Send;

    /// Stop live updates for the collection.
    fn detach(&self, handle: &CollectionHandle);

    /// Terminate the backend resource. Called once per handle.
    fn release(&self, handle: &CollectionHandle);
}
