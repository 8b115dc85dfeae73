//! Single-position cursor over a collection.
//!
//! `next_page` resolves in two tiers: a synchronous peek answers whenever
//! local state is conclusive, and only an indeterminate peek escalates to an
//! asynchronous fetch. `previous_page` never escalates, since backward
//! navigation always runs over already-materialized history.
//!
//! A cursor is dead once its own `disconnect` ran or its parent scroller was
//! disconnected. Dead cursors answer `Error(Released)` to every navigation
//! and ignore commits, without touching the backend, so callers never mistake
//! a torn-down list for one that simply ended.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::BackendError;

use super::backend::MailboxBackend;
use super::types::{CollectionHandle, CursorResult, ItemId, PeekNext};

pub struct Cursor<B: MailboxBackend> {
    backend: Arc<B>,
    handle: CollectionHandle,
    position: ItemId,
    disconnected: AtomicBool,
    /// Disconnected flag of the scroller that issued this cursor
    parent_disconnected: Arc<AtomicBool>,
}

impl<B: MailboxBackend> Cursor<B> {
    pub(crate) fn new(
        backend: Arc<B>,
        handle: CollectionHandle,
        position: ItemId,
        parent_disconnected: Arc<AtomicBool>,
    ) -> Self {
        Self {
            backend,
            handle,
            position,
            disconnected: AtomicBool::new(false),
            parent_disconnected,
        }
    }

    /// The item this cursor currently points at.
    pub fn position(&self) -> &ItemId {
        &self.position
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
            || self.parent_disconnected.load(Ordering::Acquire)
    }

    /// Resolve the item after the current position without moving.
    pub async fn next_page(&self) -> CursorResult {
        if self.is_disconnected() {
            return CursorResult::Error(BackendError::Released);
        }

        match self.backend.peek_next(&self.handle, &self.position) {
            PeekNext::None => CursorResult::End,
            PeekNext::Some(id) => CursorResult::Cursor(id),
            PeekNext::Maybe => {
                tracing::debug!(
                    "Peek after {} in {} indeterminate, fetching",
                    self.position,
                    self.handle
                );
                match self.backend.fetch_next(&self.handle, &self.position).await {
                    Ok(Some(id)) => CursorResult::Cursor(id),
                    Ok(None) => CursorResult::End,
                    Err(e) => {
                        tracing::warn!("Fetching item after {} failed: {}", self.position, e);
                        CursorResult::Error(e)
                    }
                }
            }
        }
    }

    /// Resolve the item before the current position from local state only.
    pub fn previous_page(&self) -> CursorResult {
        if self.is_disconnected() {
            return CursorResult::Error(BackendError::Released);
        }

        match self.backend.peek_prev(&self.handle, &self.position) {
            Some(id) => CursorResult::Cursor(id),
            None => CursorResult::End,
        }
    }

    /// Move one step forward if the next item is known locally.
    ///
    /// Returns the new position, or `None` if the cursor did not move.
    pub fn go_forwards(&mut self) -> Option<&ItemId> {
        if self.is_disconnected() {
            return None;
        }

        match self.backend.peek_next(&self.handle, &self.position) {
            PeekNext::Some(id) => {
                self.position = id;
                Some(&self.position)
            }
            PeekNext::None | PeekNext::Maybe => None,
        }
    }

    /// Move one step backward if the previous item is known locally.
    pub fn go_backwards(&mut self) -> Option<&ItemId> {
        if self.is_disconnected() {
            return None;
        }

        let id = self.backend.peek_prev(&self.handle, &self.position)?;
        self.position = id;
        Some(&self.position)
    }

    /// Release this cursor. Safe to call any number of times.
    pub fn disconnect(&self) {
        if self
            .disconnected
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            tracing::debug!("Cursor at {} in {} disconnected", self.position, self.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::testing::{Call, SpyBackend};

    fn cursor_on(spy: &Arc<SpyBackend>, at: &str) -> Cursor<SpyBackend> {
        Cursor::new(
            Arc::clone(spy),
            CollectionHandle::new(1, "Inbox"),
            ItemId::from(at),
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[tokio::test]
    async fn test_next_peek_none_is_end_without_fetch() {
        let spy = Arc::new(SpyBackend::new());
        spy.set_peek_next(PeekNext::None);
        let cursor = cursor_on(&spy, "item-1");

        assert_eq!(cursor.next_page().await, CursorResult::End);
        assert_eq!(spy.async_call_count(), 0);
    }

    #[tokio::test]
    async fn test_next_peek_some_resolves_without_fetch() {
        let spy = Arc::new(SpyBackend::new());
        spy.set_peek_next(PeekNext::Some(ItemId::from("item-2")));
        let cursor = cursor_on(&spy, "item-1");

        assert_eq!(
            cursor.next_page().await,
            CursorResult::Cursor(ItemId::from("item-2"))
        );
        assert_eq!(spy.async_call_count(), 0);
    }

    #[tokio::test]
    async fn test_next_peek_maybe_fetches_exactly_once() {
        let spy = Arc::new(SpyBackend::new());
        spy.set_peek_next(PeekNext::Maybe);
        spy.set_fetch_next(Ok(Some(ItemId::from("item-43"))));
        let cursor = cursor_on(&spy, "item-42");

        assert_eq!(
            cursor.next_page().await,
            CursorResult::Cursor(ItemId::from("item-43"))
        );
        assert_eq!(
            spy.calls(),
            vec![
                Call::PeekNext(ItemId::from("item-42")),
                Call::FetchNext(ItemId::from("item-42")),
            ]
        );
    }

    #[tokio::test]
    async fn test_next_fetch_none_is_end() {
        let spy = Arc::new(SpyBackend::new());
        spy.set_peek_next(PeekNext::Maybe);
        spy.set_fetch_next(Ok(None));
        let cursor = cursor_on(&spy, "item-42");

        assert_eq!(cursor.next_page().await, CursorResult::End);
    }

    #[tokio::test]
    async fn test_next_fetch_error_is_passed_through() {
        let spy = Arc::new(SpyBackend::new());
        spy.set_peek_next(PeekNext::Maybe);
        spy.set_fetch_next(Err(BackendError::Timeout));
        let cursor = cursor_on(&spy, "item-42");

        assert_eq!(
            cursor.next_page().await,
            CursorResult::Error(BackendError::Timeout)
        );
    }

    #[test]
    fn test_previous_never_escalates() {
        let spy = Arc::new(SpyBackend::new());
        let cursor = cursor_on(&spy, "item-5");

        spy.set_peek_prev(None);
        assert_eq!(cursor.previous_page(), CursorResult::End);

        spy.set_peek_prev(Some(ItemId::from("item-4")));
        assert_eq!(
            cursor.previous_page(),
            CursorResult::Cursor(ItemId::from("item-4"))
        );

        assert_eq!(spy.async_call_count(), 0);
        assert_eq!(spy.calls().len(), 2);
    }

    #[test]
    fn test_go_forwards_commits_only_known_items() {
        let spy = Arc::new(SpyBackend::new());
        let mut cursor = cursor_on(&spy, "item-1");

        spy.set_peek_next(PeekNext::Maybe);
        assert_eq!(cursor.go_forwards(), None);
        assert_eq!(cursor.position(), &ItemId::from("item-1"));

        spy.set_peek_next(PeekNext::Some(ItemId::from("item-2")));
        assert_eq!(cursor.go_forwards(), Some(&ItemId::from("item-2")));
        assert_eq!(cursor.position(), &ItemId::from("item-2"));
        assert_eq!(spy.async_call_count(), 0);
    }

    #[test]
    fn test_go_backwards() {
        let spy = Arc::new(SpyBackend::new());
        let mut cursor = cursor_on(&spy, "item-3");

        spy.set_peek_prev(Some(ItemId::from("item-2")));
        assert_eq!(cursor.go_backwards(), Some(&ItemId::from("item-2")));

        spy.set_peek_prev(None);
        assert_eq!(cursor.go_backwards(), None);
        assert_eq!(cursor.position(), &ItemId::from("item-2"));
    }

    #[tokio::test]
    async fn test_disconnected_cursor_is_inert() {
        let spy = Arc::new(SpyBackend::new());
        spy.set_peek_next(PeekNext::Some(ItemId::from("item-2")));
        spy.set_peek_prev(Some(ItemId::from("item-0")));
        let mut cursor = cursor_on(&spy, "item-1");

        cursor.disconnect();
        cursor.disconnect();

        assert!(cursor.is_disconnected());
        assert_eq!(
            cursor.next_page().await,
            CursorResult::Error(BackendError::Released)
        );
        assert_eq!(
            cursor.previous_page(),
            CursorResult::Error(BackendError::Released)
        );
        assert_eq!(cursor.go_forwards(), None);
        assert_eq!(cursor.go_backwards(), None);
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn test_parent_disconnect_kills_cursor() {
        let spy = Arc::new(SpyBackend::new());
        spy.set_peek_next(PeekNext::Some(ItemId::from("item-2")));
        let parent = Arc::new(AtomicBool::new(false));
        let cursor = Cursor::new(
            Arc::clone(&spy),
            CollectionHandle::new(1, "Inbox"),
            ItemId::from("item-1"),
            Arc::clone(&parent),
        );

        parent.store(true, Ordering::Release);

        assert!(cursor.is_disconnected());
        assert_eq!(
            cursor.next_page().await,
            CursorResult::Error(BackendError::Released)
        );
        assert_eq!(
            cursor.previous_page(),
            CursorResult::Error(BackendError::Released)
        );
        assert!(spy.calls().is_empty());
    }
}
