//! End-to-end flows through the in-memory console

use catalog_console::{
    controllers::{PickerStatus, SelectionChange},
    models::{AuthorDraft, CabinetDraft, ShelfDraft},
    repository::Catalog,
    AppConfig, Console,
};

use crate::support::{advance, settle};

fn console() -> Console {
    Console::new(
        AppConfig::default(),
        Catalog::in_memory(&["Leo Tolstoy", "Anton Chekhov", "Nikolai Gogol", "Ivan Goncharov"]),
    )
}

#[tokio::test(start_paused = true)]
async fn test_pick_author_by_word_prefix() {
    let console = console();
    let (picker, mut changes) = console.author_picker();

    picker.on_query_text_changed("tol");
    advance(301).await;
    settle().await;

    let state = picker.state();
    assert_eq!(state.status(), PickerStatus::Results);
    assert_eq!(state.results.len(), 1);
    let tolstoy = state.results[0].id;

    picker.on_enter();
    assert_eq!(changes.try_recv().unwrap(), SelectionChange::Selected(tolstoy));
    assert_eq!(picker.state().display_text(), "Leo Tolstoy");
}

#[tokio::test(start_paused = true)]
async fn test_bound_author_label_is_resolved() {
    let console = console();
    let authors = console.authors();
    settle().await;
    let gogol = authors
        .state()
        .items
        .into_iter()
        .find(|a| a.name == "Nikolai Gogol")
        .unwrap();

    let (picker, _changes) = console.author_picker();
    picker.on_external_value_changed(Some(gogol.id));
    settle().await;

    assert_eq!(picker.state().display_text(), "Nikolai Gogol");
}

#[tokio::test(start_paused = true)]
async fn test_empty_query_browses_all_authors() {
    let console = console();
    let (picker, _changes) = console.author_picker();

    picker.on_focus();
    advance(301).await;
    settle().await;

    let names: Vec<_> = picker
        .state()
        .results
        .into_iter()
        .map(|c| c.display_name)
        .collect();
    assert_eq!(names, ["Anton Chekhov", "Ivan Goncharov", "Leo Tolstoy", "Nikolai Gogol"]);
}

#[tokio::test(start_paused = true)]
async fn test_lists_share_the_catalog() {
    let console = console();
    let authors = console.authors();
    let shelves = console.shelves();
    settle().await;

    authors.create(AuthorDraft::new("Ivan Bunin")).await.unwrap();
    shelves.create(ShelfDraft::new("Russian prose", None)).await.unwrap();
    settle().await;

    assert_eq!(authors.state().items.len(), 5);
    assert_eq!(shelves.state().items.len(), 1);

    let (picker, _changes) = console.author_picker();
    picker.on_query_text_changed("bun");
    advance(301).await;
    settle().await;
    assert_eq!(picker.state().results[0].display_name, "Ivan Bunin");
}

#[tokio::test(start_paused = true)]
async fn test_blank_name_is_rejected_locally() {
    let console = console();
    let tags = console.tags();
    settle().await;

    let err = tags.create(catalog_console::models::TagDraft::new("  ")).await.unwrap_err();

    assert!(matches!(err, catalog_console::AppError::Validation(_)));
    settle().await;
    assert!(tags.state().items.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shelves_grouped_under_cabinets() {
    let console = console();
    let cabinets = console.cabinets();
    let shelves = console.shelves();
    settle().await;

    let hall = cabinets.create(CabinetDraft::new("Hall")).await.unwrap();
    cabinets.create(CabinetDraft::new("Study")).await.unwrap();
    shelves.create(ShelfDraft::new("Top", Some(hall.id))).await.unwrap();
    shelves.create(ShelfDraft::new("Loose", None)).await.unwrap();

    let groups = console.shelves_by_cabinet().await.unwrap();

    let layout: Vec<(Option<String>, Vec<String>)> = groups
        .into_iter()
        .map(|g| {
            (
                g.cabinet.map(|c| c.name),
                g.shelves.into_iter().map(|s| s.name).collect(),
            )
        })
        .collect();
    assert_eq!(
        layout,
        vec![
            (Some("Hall".to_string()), vec!["Top".to_string()]),
            (Some("Study".to_string()), vec![]),
            (None, vec!["Loose".to_string()]),
        ]
    );
}
