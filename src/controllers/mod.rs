//! UI-agnostic controllers
//!
//! Controllers own their state behind a [`tokio::sync::watch`] channel and
//! must be driven from within a Tokio runtime.

pub mod debounce;
pub mod paged_list;
pub mod search_select;

pub use debounce::DebounceScheduler;
pub use paged_list::{PagedListController, PagedListState};
pub use search_select::{PickerStatus, SearchSelectController, SearchSelectState, SelectionChange};
