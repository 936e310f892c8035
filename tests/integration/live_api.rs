//! Tests against a running catalog API

use catalog_console::{
    config::ApiConfig,
    models::{Author, PageRequest},
    repository::{ApiClient, HttpCollection, PagedCollection},
};

fn authors() -> HttpCollection<Author> {
    let client = ApiClient::new(&ApiConfig::default()).expect("Failed to build client");
    HttpCollection::new(client)
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_list_authors() {
    let page = authors()
        .list_page(PageRequest::new(1, 10, None))
        .await
        .expect("Failed to list authors");

    assert!(page.items.len() <= 10);
    assert!(page.pagination.current_page >= 1);
}

#[tokio::test]
#[ignore]
async fn test_unknown_author_is_none() {
    let found = authors()
        .get(&uuid::Uuid::new_v4())
        .await
        .expect("Failed to fetch author");

    assert!(found.is_none());
}

#[tokio::test]
#[ignore]
async fn test_all_authors() {
    let all = authors().list_all().await.expect("Failed to fetch all authors");
    let first = authors()
        .list_page(PageRequest::new(1, 10, None))
        .await
        .expect("Failed to list authors");

    assert!(all.len() >= first.items.len());
}
