//! Paginated list controller with live search
//!
//! Typing updates `raw_search_text` at once; the debounced commit copies it
//! to `committed_search_text` and resets the page to 1. Any change of the
//! `(page, committed_search_text)` pair reloads. Loads are tagged with a
//! generation and only the latest one may write `items`.

use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use validator::Validate;

use crate::{
    config::ListConfig,
    controllers::debounce::DebounceScheduler,
    error::{AppError, AppResult, FailureKind},
    models::{Entity, Page, PageRequest},
    repository::PagedCollection,
};

#[derive(Debug, Clone)]
pub struct PagedListState<E> {
    /// Text as typed
    pub raw_search_text: String,
    /// Text the current items were filtered with
    pub committed_search_text: String,
    pub page: u32,
    pub page_size: u32,
    pub items: Vec<E>,
    pub total_pages: u32,
    pub is_loading: bool,
    /// Message of the last failed load; cleared when a reload starts
    pub error: Option<String>,
    generation: u64,
    disposed: bool,
}

impl<E> PagedListState<E> {
    fn new(page_size: u32) -> Self {
        Self {
            raw_search_text: String::new(),
            committed_search_text: String::new(),
            page: 1,
            page_size: page_size.max(1),
            items: Vec::new(),
            total_pages: 1,
            is_loading: false,
            error: None,
            generation: 0,
            disposed: false,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

struct Inner<C: PagedCollection> {
    collection: C,
    debounce: DebounceScheduler,
    state: watch::Sender<PagedListState<C::Entity>>,
}

impl<C: PagedCollection> Inner<C> {
    fn update<R>(&self, f: impl FnOnce(&mut PagedListState<C::Entity>) -> R) -> Option<R> {
        let mut out = None;
        self.state.send_if_modified(|state| {
            if state.disposed {
                return false;
            }
            out = Some(f(state));
            true
        });
        out
    }

    fn reload(self: &Arc<Self>) {
        let Some((generation, request)) = self.update(|state| {
            state.generation += 1;
            state.is_loading = true;
            state.error = None;
            (
                state.generation,
                PageRequest::new(
                    state.page,
                    state.page_size,
                    Some(&state.committed_search_text),
                ),
            )
        }) else {
            return;
        };

        tracing::debug!(
            "List load #{} for page {} search {:?}",
            generation,
            request.page,
            request.search
        );
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = inner.collection.list_page(request).await;
            inner.apply_load(generation, outcome);
        });
    }

    fn apply_load(&self, generation: u64, outcome: AppResult<Page<C::Entity>>) {
        let mut failure = None;
        let applied = self.state.send_if_modified(|state| {
            if state.disposed || state.generation != generation {
                return false;
            }
            match outcome {
                Ok(page) => {
                    // The server clamps out-of-range pages, e.g. after the
                    // last row of the last page was deleted
                    state.total_pages = page.total_pages();
                    state.page = state.page.min(state.total_pages);
                    state.items = page.items;
                }
                Err(e) => {
                    state.error = Some(e.message());
                    failure = Some(e);
                }
            }
            state.is_loading = false;
            true
        });

        if !applied {
            tracing::debug!("Discarded stale list load #{}", generation);
        } else if let Some(e) = failure {
            tracing::warn!(kind = FailureKind::ListLoad.as_str(), "List load failed: {}", e);
        }
    }

    fn commit_search(self: &Arc<Self>) {
        let changed = self.update(|state| {
            let changed =
                state.committed_search_text != state.raw_search_text || state.page != 1;
            state.committed_search_text = state.raw_search_text.clone();
            state.page = 1;
            changed
        });
        if changed == Some(true) {
            self.reload();
        }
    }

    fn dispose(&self) {
        self.debounce.cancel();
        self.state.send_if_modified(|state| {
            if state.disposed {
                return false;
            }
            state.disposed = true;
            state.generation += 1;
            state.is_loading = false;
            true
        });
    }
}

/// Drives one list screen over a [`PagedCollection`].
///
/// Dropping the controller disposes it.
pub struct PagedListController<C: PagedCollection> {
    inner: Arc<Inner<C>>,
}

impl<C: PagedCollection> PagedListController<C> {
    /// Creates the controller and issues the initial load
    pub fn new(collection: C, config: &ListConfig) -> Self {
        let (state, _) = watch::channel(PagedListState::new(config.page_size));
        let inner = Arc::new(Inner {
            collection,
            debounce: DebounceScheduler::new(config.debounce()),
            state,
        });
        inner.reload();
        Self { inner }
    }

    pub fn state(&self) -> PagedListState<C::Entity> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PagedListState<C::Entity>> {
        self.inner.state.subscribe()
    }

    pub fn updates(&self) -> WatchStream<PagedListState<C::Entity>> {
        WatchStream::new(self.subscribe())
    }

    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        if self.inner.update(|state| state.raw_search_text = text).is_none() {
            return;
        }
        let weak: Weak<Inner<C>> = Arc::downgrade(&self.inner);
        self.inner.debounce.schedule(move || {
            if let Some(inner) = weak.upgrade() {
                inner.commit_search();
            }
        });
    }

    /// Moves to page `n`, clamped into `[1, total_pages]`
    pub fn set_page(&self, n: u32) {
        let changed = self.inner.update(|state| {
            let page = n.clamp(1, state.total_pages.max(1));
            let changed = page != state.page;
            state.page = page;
            changed
        });
        if changed == Some(true) {
            self.inner.reload();
        }
    }

    pub fn next_page(&self) {
        let page = self.inner.state.borrow().page;
        self.set_page(page.saturating_add(1));
    }

    pub fn prev_page(&self) {
        let page = self.inner.state.borrow().page;
        self.set_page(page.saturating_sub(1));
    }

    /// Fetches the current `(page, committed_search_text)` again
    pub fn reload(&self) {
        self.inner.reload();
    }

    /// Removes the record remotely, then drops it from `items` without a
    /// reload. On failure nothing local changes.
    pub async fn delete(&self, id: &C::Id) -> AppResult<()> {
        self.ensure_live()?;
        if let Err(e) = self.inner.collection.delete(id).await {
            tracing::warn!(kind = FailureKind::Mutation.as_str(), "Delete of {} failed: {}", id, e);
            return Err(e);
        }

        self.inner.state.send_if_modified(|state| {
            if state.disposed {
                return false;
            }
            match state.items.iter().position(|item| item.id() == id) {
                Some(index) => {
                    state.items.remove(index);
                    true
                }
                None => false,
            }
        });
        Ok(())
    }

    /// Cancels the debounce and ignores loads still in flight. Idempotent.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    fn ensure_live(&self) -> AppResult<()> {
        if self.inner.state.borrow().disposed {
            Err(AppError::Disposed)
        } else {
            Ok(())
        }
    }
}

impl<C> PagedListController<C>
where
    C: PagedCollection,
    C::Draft: Validate,
{
    /// Creates a record and reloads the current page
    pub async fn create(&self, draft: C::Draft) -> AppResult<C::Entity> {
        self.ensure_live()?;
        draft.validate()?;
        match self.inner.collection.create(draft).await {
            Ok(created) => {
                tracing::info!("Created {}", created.id());
                self.inner.reload();
                Ok(created)
            }
            Err(e) => {
                tracing::warn!(kind = FailureKind::Mutation.as_str(), "Create failed: {}", e);
                Err(e)
            }
        }
    }

    /// Updates a record and reloads the current page
    pub async fn update(&self, id: &C::Id, draft: C::Draft) -> AppResult<C::Entity> {
        self.ensure_live()?;
        draft.validate()?;
        match self.inner.collection.update(id, draft).await {
            Ok(updated) => {
                tracing::info!("Updated {}", id);
                self.inner.reload();
                Ok(updated)
            }
            Err(e) => {
                tracing::warn!(kind = FailureKind::Mutation.as_str(), "Update of {} failed: {}", id, e);
                Err(e)
            }
        }
    }
}

impl<C: PagedCollection> Drop for PagedListController<C> {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}
