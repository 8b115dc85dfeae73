//! In-memory mailbox backend.
//!
//! Holds a newest-first item list and, per opened collection, a materialized
//! window that grows one page at a time under that collection's filters.
//! Peeks answer from the window only; anything past its end that has not been
//! scanned yet is `Maybe`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::BackendError;
use crate::mail::MailItem;

use super::backend::MailboxBackend;
use super::types::{CollectionHandle, FilterState, IncludeSwitch, ItemId, PeekNext, ReadFilter};

/// Per-collection materialization state
struct CollectionState {
    filters: FilterState,
    /// Number of items the window should hold
    target: usize,
    /// Source items already examined
    scanned: usize,
    window: Vec<ItemId>,
    /// Whether delivered items still show up in this collection
    live: bool,
}

impl CollectionState {
    fn new(filters: FilterState) -> Self {
        Self {
            filters,
            target: 0,
            scanned: 0,
            window: Vec::new(),
            live: true,
        }
    }

    fn fill(&mut self, items: &[MailItem]) {
        while self.window.len() < self.target && self.scanned < items.len() {
            let item = &items[self.scanned];
            self.scanned += 1;
            if item.matches(&self.filters) {
                self.window.push(item.id.clone());
            }
        }
    }

    fn reset(&mut self) {
        self.scanned = 0;
        self.window.clear();
    }

    fn exhausted(&self, items: &[MailItem]) -> bool {
        self.scanned >= items.len()
    }

    fn index_of(&self, id: &ItemId) -> Option<usize> {
        self.window.iter().position(|w| w == id)
    }
}

struct MailboxState {
    /// Newest first
    items: Vec<MailItem>,
    collections: HashMap<u64, CollectionState>,
}

/// Newest-first mailbox backing the CLI and tests.
///
/// Changing a collection's filters empties its window right away, and the
/// next `fetch_more` or `refetch_all` rebuilds it from the top. That is how
/// this backend behaves, not something [`ListScroller`] promises: other
/// backends may keep serving the old window until a reload.
///
/// [`ListScroller`]: super::ListScroller
pub struct MemoryMailbox {
    state: Mutex<MailboxState>,
    next_id: AtomicU64,
    page_size: usize,
    latency: Duration,
    include_capable: bool,
}

impl MemoryMailbox {
    pub fn new(mut items: Vec<MailItem>, page_size: usize) -> Self {
        items.sort_by(|a, b| b.date.cmp(&a.date));
        Self {
            state: Mutex::new(MailboxState {
                items,
                collections: HashMap::new(),
            }),
            next_id: AtomicU64::new(1),
            page_size: page_size.max(1),
            latency: Duration::ZERO,
            include_capable: true,
        }
    }

    /// Delay every asynchronous call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_include_capability(mut self, capable: bool) -> Self {
        self.include_capable = capable;
        self
    }

    /// Open a new collection view. Its window starts empty.
    pub fn open(&self, label: &str, filters: FilterState) -> CollectionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock()
            .collections
            .insert(id, CollectionState::new(filters));
        tracing::debug!("Opened collection {}#{} with {:?}", label, id, filters);
        CollectionHandle::new(id, label)
    }

    pub fn is_open(&self, handle: &CollectionHandle) -> bool {
        self.lock().collections.contains_key(&handle.id())
    }

    #[cfg(test)]
    fn is_live(&self, handle: &CollectionHandle) -> bool {
        self.lock()
            .collections
            .get(&handle.id())
            .is_some_and(|c| c.live)
    }

    /// Items currently materialized for `handle`, in list order.
    pub fn window(&self, handle: &CollectionHandle) -> Vec<MailItem> {
        let state = self.lock();
        let Some(collection) = state.collections.get(&handle.id()) else {
            return Vec::new();
        };
        let by_id: HashMap<&ItemId, &MailItem> =
            state.items.iter().map(|item| (&item.id, item)).collect();
        collection
            .window
            .iter()
            .filter_map(|id| by_id.get(id).map(|item| (*item).clone()))
            .collect()
    }

    /// Add a new item at the top of the mailbox.
    ///
    /// Live collections whose filters match see it at the top of their window.
    pub fn deliver(&self, item: MailItem) {
        let mut guard = self.lock();
        let MailboxState { items, collections } = &mut *guard;
        for collection in collections.values_mut() {
            collection.scanned += 1;
            if collection.live && item.matches(&collection.filters) {
                collection.window.insert(0, item.id.clone());
            }
        }
        tracing::debug!("Delivered {}", item.id);
        items.insert(0, item);
    }

    fn lock(&self) -> MutexGuard<'_, MailboxState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn grow(&self, handle: &CollectionHandle, rebuild: bool) -> Result<(), BackendError> {
        let mut guard = self.lock();
        let MailboxState { items, collections } = &mut *guard;
        let collection = collections
            .get_mut(&handle.id())
            .ok_or(BackendError::Released)?;

        if rebuild {
            collection.reset();
            collection.target = collection.target.max(self.page_size);
        } else {
            collection.target = collection.window.len() + self.page_size;
        }
        collection.fill(items);
        Ok(())
    }

    fn resolve_next(
        &self,
        handle: &CollectionHandle,
        position: &ItemId,
    ) -> Result<Option<ItemId>, BackendError> {
        let mut guard = self.lock();
        let MailboxState { items, collections } = &mut *guard;
        let collection = collections
            .get_mut(&handle.id())
            .ok_or(BackendError::Released)?;

        loop {
            if let Some(idx) = collection.index_of(position)
                && let Some(next) = collection.window.get(idx + 1)
            {
                return Ok(Some(next.clone()));
            }
            if collection.exhausted(items) {
                return Ok(None);
            }
            collection.target = collection.window.len() + self.page_size;
            collection.fill(items);
        }
    }

    /// Store new filters and drop the window built under the old ones.
    fn update_filters(&self, handle: &CollectionHandle, apply: impl FnOnce(&mut FilterState)) {
        let mut guard = self.lock();
        match guard.collections.get_mut(&handle.id()) {
            Some(collection) => {
                apply(&mut collection.filters);
                collection.reset();
            }
            None => tracing::debug!("Filter change for released collection {}", handle),
        }
    }
}

impl MailboxBackend for MemoryMailbox {
    fn peek_next(&self, handle: &CollectionHandle, position: &ItemId) -> PeekNext {
        let state = self.lock();
        let Some(collection) = state.collections.get(&handle.id()) else {
            return PeekNext::None;
        };

        if let Some(idx) = collection.index_of(position)
            && let Some(next) = collection.window.get(idx + 1)
        {
            return PeekNext::Some(next.clone());
        }

        if collection.exhausted(&state.items) {
            PeekNext::None
        } else {
            PeekNext::Maybe
        }
    }

    fn peek_prev(&self, handle: &CollectionHandle, position: &ItemId) -> Option<ItemId> {
        let state = self.lock();
        let collection = state.collections.get(&handle.id())?;
        let idx = collection.index_of(position)?;
        idx.checked_sub(1).map(|prev| collection.window[prev].clone())
    }

    fn fetch_next(
        &self,
        handle: &CollectionHandle,
        position: &ItemId,
    ) -> impl Future<Output = Result<Option<ItemId>, BackendError>> + Send {
        async move {
            self.simulate_latency().await;
            self.resolve_next(handle, position)
        }
    }

    fn apply_filter(&self, handle: &CollectionHandle, filter: ReadFilter) {
        self.update_filters(handle, |filters| filters.read = filter);
    }

    fn apply_include(&self, handle: &CollectionHandle, include: IncludeSwitch) {
        self.update_filters(handle, |filters| filters.include = include);
    }

    fn fetch_more(
        &self,
        handle: &CollectionHandle,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        async move {
            self.simulate_latency().await;
            self.grow(handle, false)
        }
    }

    fn refetch_all(
        &self,
        handle: &CollectionHandle,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        async move {
            self.simulate_latency().await;
            self.grow(handle, true)
        }
    }

    fn query_include_capability(
        &self,
        handle: &CollectionHandle,
    ) -> impl Future<Output = Result<bool, BackendError>> + Send {
        async move {
            self.simulate_latency().await;
            if self.is_open(handle) {
                Ok(self.include_capable)
            } else {
                Err(BackendError::Released)
            }
        }
    }

    fn detach(&self, handle: &CollectionHandle) {
        if let Some(collection) = self.lock().collections.get_mut(&handle.id()) {
            collection.live = false;
        }
    }

    fn release(&self, handle: &CollectionHandle) {
        if self.lock().collections.remove(&handle.id()).is_none() {
            tracing::warn!("Release of unknown collection {}", handle);
        }
    }
}
