//! Integration tests for the catalog console

mod console;
mod live_api;
mod paged_list;
mod search_select;
