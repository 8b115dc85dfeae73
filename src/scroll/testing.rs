//! Recording backend for unit tests.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::error::BackendError;

use super::backend::MailboxBackend;
use super::types::{CollectionHandle, IncludeSwitch, ItemId, PeekNext, ReadFilter};

/// One recorded backend interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    PeekNext(ItemId),
    PeekPrev(ItemId),
    FetchNext(ItemId),
    ApplyFilter(ReadFilter),
    ApplyInclude(IncludeSwitch),
    FetchMore,
    RefetchAll,
    QueryCapability,
    Detach,
    Release,
}

impl Call {
    fn is_async(&self) -> bool {
        matches!(
            self,
            Call::FetchNext(_) | Call::FetchMore | Call::RefetchAll | Call::QueryCapability
        )
    }
}

/// Holds a `fetch_more` call open until the test lets it finish.
#[derive(Default)]
pub struct FetchGate {
    pub entered: Notify,
    pub release: Notify,
}

pub struct SpyBackend {
    calls: Mutex<Vec<Call>>,
    peek_next: Mutex<PeekNext>,
    peek_prev: Mutex<Option<ItemId>>,
    fetch_next: Mutex<Result<Option<ItemId>, BackendError>>,
    fetch_more: Mutex<Result<(), BackendError>>,
    capability: Mutex<Result<bool, BackendError>>,
    gate: Mutex<Option<Arc<FetchGate>>>,
}

impl SpyBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            peek_next: Mutex::new(PeekNext::None),
            peek_prev: Mutex::new(None),
            fetch_next: Mutex::new(Ok(None)),
            fetch_more: Mutex::new(Ok(())),
            capability: Mutex::new(Ok(true)),
            gate: Mutex::new(None),
        }
    }

    pub fn set_peek_next(&self, answer: PeekNext) {
        *self.peek_next.lock().unwrap() = answer;
    }

    pub fn set_peek_prev(&self, answer: Option<ItemId>) {
        *self.peek_prev.lock().unwrap() = answer;
    }

    pub fn set_fetch_next(&self, answer: Result<Option<ItemId>, BackendError>) {
        *self.fetch_next.lock().unwrap() = answer;
    }

    /// Result for both `fetch_more` and `refetch_all`.
    pub fn set_fetch_more(&self, answer: Result<(), BackendError>) {
        *self.fetch_more.lock().unwrap() = answer;
    }

    pub fn set_capability(&self, answer: Result<bool, BackendError>) {
        *self.capability.lock().unwrap() = answer;
    }

    pub fn install_gate(&self) -> Arc<FetchGate> {
        let gate = Arc::new(FetchGate::default());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn async_call_count(&self) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.is_async()).count()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn bulk_fetch(&self, call: Call) -> impl Future<Output = Result<(), BackendError>> + Send {
        self.record(call);
        let result = self.fetch_more.lock().unwrap().clone();
        let gate = self.gate.lock().unwrap().clone();
        async move {
            if let Some(gate) = gate {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
            result
        }
    }
}

impl MailboxBackend for SpyBackend {
    fn peek_next(&self, _handle: &CollectionHandle, position: &ItemId) -> PeekNext {
        self.record(Call::PeekNext(position.clone()));
        self.peek_next.lock().unwrap().clone()
    }

    fn peek_prev(&self, _handle: &CollectionHandle, position: &ItemId) -> Option<ItemId> {
        self.record(Call::PeekPrev(position.clone()));
        self.peek_prev.lock().unwrap().clone()
    }

    fn fetch_next(
        &self,
        _handle: &CollectionHandle,
        position: &ItemId,
    ) -> impl Future<Output = Result<Option<ItemId>, BackendError>> + Send {
        self.record(Call::FetchNext(position.clone()));
        let result = self.fetch_next.lock().unwrap().clone();
        async move { result }
    }

    fn apply_filter(&self, _handle: &CollectionHandle, filter: ReadFilter) {
        self.record(Call::ApplyFilter(filter));
    }

    fn apply_include(&self, _handle: &CollectionHandle, include: IncludeSwitch) {
        self.record(Call::ApplyInclude(include));
    }

    fn fetch_more(
        &self,
        _handle: &CollectionHandle,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        self.bulk_fetch(Call::FetchMore)
    }

    fn refetch_all(
        &self,
        _handle: &CollectionHandle,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        self.bulk_fetch(Call::RefetchAll)
    }

    fn query_include_capability(
        &self,
        _handle: &CollectionHandle,
    ) -> impl Future<Output = Result<bool, BackendError>> + Send {
        self.record(Call::QueryCapability);
        let result = self.capability.lock().unwrap().clone();
        async move { result }
    }

    fn detach(&self, _handle: &CollectionHandle) {
        self.record(Call::Detach);
    }

    fn release(&self, _handle: &CollectionHandle) {
        self.record(Call::Release);
    }
}
