//! Async reference picker
//!
//! Free-text input drives a debounced server-side search; results are
//! keyboard-navigable and the committed pick is reported to the host. The
//! host's bound id flows back in through
//! [`SearchSelectController::on_external_value_changed`], which resolves the
//! label on its own when it is not already known.
//!
//! Every search and every label lookup carries a generation number. A
//! completion is applied only if its generation is still the current one,
//! so responses arriving out of order never overwrite newer state.

use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::WatchStream;

use crate::{
    config::PickerConfig,
    controllers::debounce::DebounceScheduler,
    error::{AppResult, FailureKind},
    models::{non_blank, Candidate},
    repository::CandidateSource,
};

/// Selection changes reported to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange<Id> {
    Selected(Id),
    /// The user started typing over a previous pick
    Cleared,
}

/// What the dropdown should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerStatus {
    Closed,
    Searching,
    /// Query typed, nothing matched
    NothingFound,
    /// Empty query and no results yet
    TypeToSearch,
    Results,
}

#[derive(Debug, Clone)]
pub struct SearchSelectState<Id> {
    pub query_text: String,
    pub is_open: bool,
    pub is_loading: bool,
    /// Results of the latest applied search
    pub results: Vec<Candidate<Id>>,
    pub highlighted_index: usize,
    pub selected: Option<Candidate<Id>>,
    /// Id currently bound by the host
    pub external_value: Option<Id>,
    search_generation: u64,
    lookup_generation: u64,
    clear_reported: bool,
    disposed: bool,
}

impl<Id> SearchSelectState<Id> {
    fn new() -> Self {
        Self {
            query_text: String::new(),
            is_open: false,
            is_loading: false,
            results: Vec::new(),
            highlighted_index: 0,
            selected: None,
            external_value: None,
            search_generation: 0,
            lookup_generation: 0,
            clear_reported: false,
            disposed: false,
        }
    }

    /// Text for the input: the selected label while nothing is typed
    pub fn display_text(&self) -> &str {
        match &self.selected {
            Some(selected) if self.query_text.is_empty() => &selected.display_name,
            _ => &self.query_text,
        }
    }

    pub fn highlighted(&self) -> Option<&Candidate<Id>> {
        if self.is_open {
            self.results.get(self.highlighted_index)
        } else {
            None
        }
    }

    pub fn status(&self) -> PickerStatus {
        if !self.is_open {
            PickerStatus::Closed
        } else if self.is_loading {
            PickerStatus::Searching
        } else if !self.results.is_empty() {
            PickerStatus::Results
        } else if self.query_text.trim().is_empty() {
            PickerStatus::TypeToSearch
        } else {
            PickerStatus::NothingFound
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

enum KeyOutcome<Id> {
    Opened,
    Commit(Candidate<Id>),
    Handled,
}

enum ExternalSync<Id> {
    Done,
    Lookup { generation: u64, id: Id },
}

struct Inner<S: CandidateSource> {
    source: Arc<S>,
    result_limit: usize,
    debounce: DebounceScheduler,
    state: watch::Sender<SearchSelectState<S::Id>>,
    changes: mpsc::UnboundedSender<SelectionChange<S::Id>>,
}

impl<S: CandidateSource> Inner<S> {
    /// Mutates live state; `None` once disposed
    fn update<R>(&self, f: impl FnOnce(&mut SearchSelectState<S::Id>) -> R) -> Option<R> {
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

    fn notify(&self, change: SelectionChange<S::Id>) {
        if self.changes.send(change).is_err() {
            tracing::debug!("Picker host stopped listening for selection changes");
        }
    }

    fn schedule_search(self: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        self.debounce.schedule(move || {
            if let Some(inner) = weak.upgrade() {
                inner.execute_search();
            }
        });
    }

    fn execute_search(self: &Arc<Self>) {
        let Some((generation, query)) = self.update(|state| {
            state.search_generation += 1;
            state.is_loading = true;
            (
                state.search_generation,
                non_blank(&state.query_text).map(str::to_string),
            )
        }) else {
            return;
        };

        tracing::debug!("Picker search #{} issued for {:?}", generation, query);
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = inner.source.search(query, inner.result_limit).await;
            inner.apply_search(generation, outcome);
        });
    }

    fn apply_search(&self, generation: u64, outcome: AppResult<Vec<Candidate<S::Id>>>) {
        let mut failure = None;
        let applied = self.state.send_if_modified(|state| {
            if state.disposed || state.search_generation != generation {
                return false;
            }
            state.results = match outcome {
                Ok(results) => results,
                Err(e) => {
                    failure = Some(e);
                    Vec::new()
                }
            };
            state.is_loading = false;
            state.highlighted_index = 0;
            true
        });

        if !applied {
            tracing::debug!("Discarded stale picker search #{}", generation);
        } else if let Some(e) = failure {
            tracing::warn!(kind = FailureKind::Search.as_str(), "Picker search failed: {}", e);
        }
    }

    fn execute_lookup(self: &Arc<Self>, generation: u64, id: S::Id) {
        tracing::debug!("Resolving label for bound id {}", id);
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = inner.source.lookup_by_id(&id).await;
            inner.apply_lookup(generation, &id, outcome);
        });
    }

    fn apply_lookup(
        &self,
        generation: u64,
        id: &S::Id,
        outcome: AppResult<Option<Candidate<S::Id>>>,
    ) {
        let mut unresolved = None;
        let applied = self.state.send_if_modified(|state| {
            if state.disposed || state.lookup_generation != generation {
                return false;
            }
            match outcome {
                Ok(Some(candidate)) if candidate.id == *id => {
                    state.selected = Some(candidate);
                    true
                }
                Ok(_) => {
                    unresolved = Some(format!("no record with id {}", id));
                    false
                }
                Err(e) => {
                    unresolved = Some(e.to_string());
                    false
                }
            }
        });

        if let Some(reason) = unresolved {
            tracing::warn!(kind = FailureKind::Lookup.as_str(), "Could not resolve label for {}: {}", id, reason);
        } else if !applied {
            tracing::debug!("Discarded stale label lookup for {}", id);
        }
    }

    fn dispose(&self) {
        self.debounce.cancel();
        self.state.send_if_modified(|state| {
            if state.disposed {
                return false;
            }
            state.disposed = true;
            state.search_generation += 1;
            state.lookup_generation += 1;
            state.is_loading = false;
            true
        });
    }
}

/// Search-and-select control logic for one picker instance.
///
/// Dropping the controller disposes it: the pending debounce is cancelled
/// and responses still in flight are ignored.
pub struct SearchSelectController<S: CandidateSource> {
    inner: Arc<Inner<S>>,
}

impl<S: CandidateSource> SearchSelectController<S> {
    /// Creates a picker; the receiver yields the selection changes the host
    /// has to apply to its bound value
    pub fn new(
        source: Arc<S>,
        config: &PickerConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SelectionChange<S::Id>>) {
        let (changes, receiver) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(SearchSelectState::new());
        let inner = Arc::new(Inner {
            source,
            result_limit: config.result_limit,
            debounce: DebounceScheduler::new(config.debounce()),
            state,
            changes,
        });
        (Self { inner }, receiver)
    }

    pub fn state(&self) -> SearchSelectState<S::Id> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSelectState<S::Id>> {
        self.inner.state.subscribe()
    }

    pub fn updates(&self) -> WatchStream<SearchSelectState<S::Id>> {
        WatchStream::new(self.subscribe())
    }

    pub fn on_query_text_changed(&self, text: impl Into<String>) {
        let text = text.into();
        let cleared = self.inner.update(|state| {
            state.query_text = text;
            state.highlighted_index = 0;
            state.is_open = true;

            let had_pick = state.selected.take().is_some();
            let bound = state.external_value.is_some() && !state.clear_reported;
            if had_pick || bound {
                state.lookup_generation += 1;
                state.clear_reported = true;
                true
            } else {
                false
            }
        });
        match cleared {
            None => return,
            Some(true) => self.inner.notify(SelectionChange::Cleared),
            Some(false) => {}
        }
        self.inner.schedule_search();
    }

    /// Opens the dropdown and searches with the current text, so results
    /// show up without typing
    pub fn on_focus(&self) {
        if self.inner.update(|state| state.is_open = true).is_some() {
            self.inner.schedule_search();
        }
    }

    pub fn on_blur_outside(&self) {
        if self.inner.update(|state| state.is_open = false).is_some() {
            self.inner.debounce.cancel();
        }
    }

    pub fn on_escape(&self) {
        let closed = self.inner.update(|state| {
            state.is_open = false;
            state.query_text.clear();
            state.highlighted_index = 0;
        });
        if closed.is_some() {
            self.inner.debounce.cancel();
        }
    }

    pub fn on_arrow_down(&self) {
        let outcome = self.inner.update(|state| {
            if !state.is_open {
                state.is_open = true;
                return KeyOutcome::Opened;
            }
            if !state.results.is_empty() {
                state.highlighted_index = (state.highlighted_index + 1).min(state.results.len() - 1);
            }
            KeyOutcome::Handled
        });
        self.finish_key(outcome);
    }

    pub fn on_arrow_up(&self) {
        self.inner.update(|state| {
            if state.is_open {
                state.highlighted_index = state.highlighted_index.saturating_sub(1);
            }
        });
    }

    /// Opens a closed dropdown, or commits the highlighted result
    pub fn on_enter(&self) {
        let outcome = self.inner.update(|state| {
            if !state.is_open {
                state.is_open = true;
                return KeyOutcome::Opened;
            }
            match state.results.get(state.highlighted_index) {
                Some(candidate) => KeyOutcome::Commit(candidate.clone()),
                None => KeyOutcome::Handled,
            }
        });
        self.finish_key(outcome);
    }

    /// Pointer hover over a visible result
    pub fn on_hover(&self, index: usize) {
        self.inner.update(|state| {
            if state.is_open && index < state.results.len() {
                state.highlighted_index = index;
            }
        });
    }

    /// Direct pick of a visible candidate
    pub fn on_select_candidate(&self, candidate: Candidate<S::Id>) {
        self.commit(candidate);
    }

    /// Host-driven change of the bound id
    pub fn on_external_value_changed(&self, id: Option<S::Id>) {
        let sync = self.inner.update(|state| {
            state.external_value = id.clone();
            state.clear_reported = false;
            match id {
                None => {
                    state.selected = None;
                    state.lookup_generation += 1;
                    ExternalSync::Done
                }
                Some(id) if state.selected.as_ref().is_some_and(|s| s.id == id) => ExternalSync::Done,
                Some(id) => {
                    state.selected = None;
                    state.lookup_generation += 1;
                    ExternalSync::Lookup {
                        generation: state.lookup_generation,
                        id,
                    }
                }
            }
        });
        if let Some(ExternalSync::Lookup { generation, id }) = sync {
            self.inner.execute_lookup(generation, id);
        }
    }

    /// Cancels the debounce and ignores every response still in flight.
    /// Idempotent.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    fn finish_key(&self, outcome: Option<KeyOutcome<S::Id>>) {
        match outcome {
            Some(KeyOutcome::Opened) => self.inner.schedule_search(),
            Some(KeyOutcome::Commit(candidate)) => self.commit(candidate),
            Some(KeyOutcome::Handled) | None => {}
        }
    }

    fn commit(&self, candidate: Candidate<S::Id>) {
        let id = candidate.id.clone();
        let committed = self.inner.update(|state| {
            state.selected = Some(candidate);
            state.is_open = false;
            state.query_text.clear();
            state.highlighted_index = 0;
            state.lookup_generation += 1;
            state.clear_reported = false;
        });
        if committed.is_some() {
            self.inner.debounce.cancel();
            tracing::debug!("Picker committed {}", id);
            self.inner.notify(SelectionChange::Selected(id));
        }
    }
}

impl<S: CandidateSource> Drop for SearchSelectController<S> {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}
