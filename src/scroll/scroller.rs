//! Filterable, paginated view over one backend collection.
//!
//! The scroller owns the collection handle from creation until `disconnect`,
//! forwards filter changes, grows or refreshes the backend window, and hands
//! out [`Cursor`]s. Every operation checks the disconnected flag before it
//! touches the backend.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::ScrollerConfig;
use crate::error::{BackendError, PaginationError};

use super::backend::MailboxBackend;
use super::cursor::Cursor;
use super::types::{CollectionHandle, FilterState, IncludeSwitch, ItemId, ReadFilter};

pub struct ListScroller<B: MailboxBackend> {
    backend: Arc<B>,
    handle: CollectionHandle,
    config: ScrollerConfig,
    filters: Mutex<FilterState>,
    /// Bumped on every filter mutation so in-flight fetches can detect staleness
    filter_generation: AtomicU64,
    /// Shared with every cursor this scroller issued
    disconnected: Arc<AtomicBool>,
    capability: Mutex<Option<bool>>,
}

impl<B: MailboxBackend> ListScroller<B> {
    /// Bind a scroller to a collection the backend already opened with `filters`.
    pub fn new(
        backend: Arc<B>,
        handle: CollectionHandle,
        filters: FilterState,
        config: ScrollerConfig,
    ) -> Self {
        tracing::debug!("Scroller created for {} with {:?}", handle, filters);
        Self {
            backend,
            handle,
            config,
            filters: Mutex::new(filters),
            filter_generation: AtomicU64::new(0),
            disconnected: Arc::new(AtomicBool::new(false)),
            capability: Mutex::new(None),
        }
    }

    pub fn handle(&self) -> &CollectionHandle {
        &self.handle
    }

    pub fn filters(&self) -> FilterState {
        *self.filters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
    }

    /// Whether the collection can show spam and trash.
    ///
    /// A disconnected scroller answers `false` without asking the backend.
    /// Backend failures also answer `false`.
    pub async fn supports_include_filter(&self) -> bool {
        if self.is_disconnected() {
            return false;
        }

        if let Some(cached) = self.cached_capability() {
            return cached;
        }

        let supported = match self.backend.query_include_capability(&self.handle).await {
            Ok(supported) => supported,
            Err(e) => {
                tracing::warn!("Include capability probe for {} failed: {}", self.handle, e);
                return false;
            }
        };

        // Disconnect may have landed while the probe was in flight.
        if self.is_disconnected() {
            return false;
        }

        if self.config.cache_capability {
            *self.capability.lock().unwrap_or_else(PoisonError::into_inner) = Some(supported);
        }
        supported
    }

    /// Materialize one more page under the current filters.
    pub async fn next_page(&self) -> Result<(), PaginationError> {
        if self.is_disconnected() {
            return Err(PaginationError::PaginatorAlreadyTerminated);
        }

        let generation = self.filter_generation.load(Ordering::Acquire);
        tracing::debug!("Fetching next page of {}", self.handle);
        let result = self.backend.fetch_more(&self.handle).await;
        self.finish_fetch("next page", generation, result)
    }

    /// Re-materialize the current window under the current filters.
    pub async fn reload(&self) -> Result<(), PaginationError> {
        if self.is_disconnected() {
            return Err(PaginationError::PaginatorAlreadyTerminated);
        }

        let generation = self.filter_generation.load(Ordering::Acquire);
        tracing::debug!("Reloading {}", self.handle);
        let result = self.backend.refetch_all(&self.handle).await;
        self.finish_fetch("reload", generation, result)
    }

    /// Create a cursor anchored at `item_id`.
    ///
    /// The item is not checked for existence; the cursor discovers that
    /// lazily when it navigates.
    pub async fn get_cursor(&self, item_id: ItemId) -> Result<Cursor<B>, PaginationError> {
        if self.is_disconnected() {
            return Err(PaginationError::PaginatorAlreadyTerminated);
        }

        tracing::debug!("Cursor requested at {} in {}", item_id, self.handle);
        Ok(Cursor::new(
            Arc::clone(&self.backend),
            self.handle.clone(),
            item_id,
            Arc::clone(&self.disconnected),
        ))
    }

    /// Show only unread items when `show` is true.
    ///
    /// Takes effect on the next fetch; callers reload if they need it now.
    pub fn filter_unread(&self, show: bool) {
        if self.is_disconnected() {
            return;
        }

        let filter = if show {
            ReadFilter::Unread
        } else {
            ReadFilter::All
        };
        self.update_filters(|filters| filters.read = filter);
        self.backend.apply_filter(&self.handle, filter);
    }

    /// Include spam and trash when `show` is true.
    pub fn show_spam_and_trash(&self, show: bool) {
        if self.is_disconnected() {
            return;
        }

        let include = if show {
            IncludeSwitch::WithSpamAndTrash
        } else {
            IncludeSwitch::Default
        };
        self.update_filters(|filters| filters.include = include);
        self.backend.apply_include(&self.handle, include);
    }

    /// Detach and release the collection. Only the first call has an effect.
    pub fn disconnect(&self) {
        if self
            .disconnected
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Scroller for {} already disconnected", self.handle);
            return;
        }

        self.backend.detach(&self.handle);
        self.backend.release(&self.handle);
        *self.capability.lock().unwrap_or_else(PoisonError::into_inner) = None;

        tracing::info!("Scroller for {} disconnected", self.handle);
    }

    fn cached_capability(&self) -> Option<bool> {
        *self.capability.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_filters(&self, apply: impl FnOnce(&mut FilterState)) {
        let mut filters = self.filters.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut filters);
        self.filter_generation.fetch_add(1, Ordering::AcqRel);
        tracing::debug!("Filters for {} now {:?}", self.handle, *filters);
    }

    fn finish_fetch(
        &self,
        operation: &str,
        generation: u64,
        result: Result<(), BackendError>,
    ) -> Result<(), PaginationError> {
        if let Err(e) = result {
            tracing::warn!("{} of {} failed: {}", operation, self.handle, e);
            return Err(e.into());
        }

        if self.config.reject_stale && self.filter_generation.load(Ordering::Acquire) != generation
        {
            tracing::debug!(
                "Discarding {} of {}: filters changed in flight",
                operation,
                self.handle
            );
            return Err(PaginationError::StaleFilters);
        }

        Ok(())
    }
}

impl<B: MailboxBackend> Drop for ListScroller<B> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
