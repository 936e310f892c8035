//! Ordering and mutation behavior of the paged list controller

use std::sync::Arc;
use uuid::Uuid;

use catalog_console::{
    config::ListConfig,
    controllers::PagedListController,
    error::AppError,
    models::{PageRequest, Tag},
    repository::{MemoryCollection, PagedCollection},
};

use crate::support::{advance, settle, tag_page, GatedTags};

fn at(page: u32, search: Option<&'static str>) -> impl Fn(&PageRequest) -> bool {
    move |request| request.page == page && request.search.as_deref() == search
}

fn memory_tags(count: usize) -> Arc<MemoryCollection<Tag>> {
    let tags = MemoryCollection::new();
    for n in 0..count {
        tags.insert(Tag {
            id: Uuid::new_v4(),
            name: format!("tag {:02}", n),
        });
    }
    Arc::new(tags)
}

#[tokio::test(start_paused = true)]
async fn test_search_discards_page_requested_before_it() {
    let tags = Arc::new(GatedTags::default());
    let list = PagedListController::new(Arc::clone(&tags), &ListConfig::default());
    settle().await;
    tags.loads.release(at(1, None), Ok(tag_page(&["a", "b"], 3)));
    settle().await;

    list.set_page(2);
    list.set_search_text("x");
    advance(351).await;
    assert_eq!(tags.loads.requests().len(), 2);

    tags.loads.release(at(1, Some("x")), Ok(tag_page(&["xylography"], 1)));
    settle().await;
    tags.loads.release(at(2, None), Ok(tag_page(&["c", "d"], 3)));
    settle().await;

    let state = list.state();
    assert_eq!(state.page, 1);
    assert_eq!(state.committed_search_text, "x");
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].name, "xylography");
    assert!(!state.is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_typing_burst_commits_once() {
    let tags = Arc::new(GatedTags::default());
    let list = PagedListController::new(Arc::clone(&tags), &ListConfig::default());
    settle().await;
    tags.loads.release(at(1, None), Ok(tag_page(&["a"], 1)));

    for text in ["n", "no", "nov"] {
        list.set_search_text(text);
        advance(100).await;
    }
    assert!(tags.loads.requests().is_empty());
    assert_eq!(list.state().raw_search_text, "nov");

    advance(300).await;
    let requests = tags.loads.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].search.as_deref(), Some("nov"));
    assert_eq!(requests[0].per_page, 10);
}

#[tokio::test(start_paused = true)]
async fn test_search_from_deep_page_lands_on_first_page() {
    let list = PagedListController::new(memory_tags(35), &ListConfig::default());
    settle().await;
    assert_eq!(list.state().total_pages, 4);

    list.set_page(3);
    settle().await;
    assert_eq!(list.state().items[0].name, "tag 20");

    list.set_search_text("abc");
    advance(351).await;

    let state = list.state();
    assert_eq!(state.page, 1);
    assert_eq!(state.committed_search_text, "abc");
    assert!(state.items.is_empty());
    assert_eq!(state.total_pages, 1);
}

#[tokio::test(start_paused = true)]
async fn test_delete_removes_one_entry_and_keeps_page() {
    let tags = memory_tags(25);
    let list = PagedListController::new(Arc::clone(&tags), &ListConfig::default());
    settle().await;
    list.set_page(2);
    settle().await;

    let before = list.state().items;
    let doomed = before[4].id;
    list.delete(&doomed).await.unwrap();

    let after = list.state();
    assert_eq!(after.page, 2);
    assert_eq!(after.items.len(), before.len() - 1);
    let expected: Vec<_> = before.into_iter().filter(|t| t.id != doomed).collect();
    assert_eq!(after.items, expected);
    assert_eq!(tags.len(), 24);
}

#[tokio::test(start_paused = true)]
async fn test_failed_delete_changes_nothing() {
    let tags = memory_tags(5);
    let list = PagedListController::new(Arc::clone(&tags), &ListConfig::default());
    settle().await;
    let before = list.state().items;

    let result = list.delete(&Uuid::new_v4()).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(list.state().items, before);
    assert_eq!(list.state().error, None);
}

#[tokio::test(start_paused = true)]
async fn test_created_record_shows_after_reload() {
    let tags = memory_tags(3);
    let list = PagedListController::new(Arc::clone(&tags), &ListConfig::default());
    settle().await;

    let created = list
        .create(catalog_console::models::TagDraft::new("  aardvark "))
        .await
        .unwrap();
    settle().await;

    assert_eq!(created.name, "aardvark");
    assert_eq!(list.state().items[0].id, created.id);
    assert!(tags.get(&created.id).await.unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_emptied_last_page_falls_back_to_new_last_page() {
    let tags = memory_tags(21);
    let list = PagedListController::new(Arc::clone(&tags), &ListConfig::default());
    settle().await;
    list.set_page(3);
    settle().await;
    let last = list.state().items;
    assert_eq!(last.len(), 1);

    list.delete(&last[0].id).await.unwrap();
    list.reload();
    settle().await;

    let state = list.state();
    assert_eq!(state.total_pages, 2);
    assert_eq!(state.page, 2);
    assert_eq!(state.items.len(), 10);
    assert_eq!(state.items[0].name, "tag 10");
    assert!(!state.has_next());
    assert!(state.has_prev());
}

#[tokio::test(start_paused = true)]
async fn test_stale_failed_load_is_ignored() {
    let tags = Arc::new(GatedTags::default());
    let list = PagedListController::new(Arc::clone(&tags), &ListConfig::default());
    settle().await;
    tags.loads.release(at(1, None), Ok(tag_page(&["a"], 3)));
    settle().await;

    list.set_page(2);
    list.set_page(3);
    settle().await;

    tags.loads.release(
        at(2, None),
        Err(AppError::Api {
            status: 500,
            message: "Internal Server Error".to_string(),
        }),
    );
    settle().await;

    let state = list.state();
    assert_eq!(state.error, None);
    assert!(state.is_loading);
    assert_eq!(state.items[0].name, "a");

    tags.loads.release(at(3, None), Ok(tag_page(&["c"], 3)));
    settle().await;

    let state = list.state();
    assert_eq!(state.error, None);
    assert!(!state.is_loading);
    assert_eq!(state.page, 3);
    assert_eq!(state.items[0].name, "c");
}
