//! Ordering guarantees of the search-select controller

use std::sync::Arc;

use catalog_console::{
    config::PickerConfig,
    controllers::{SearchSelectController, SelectionChange},
};

use crate::support::{advance, candidate, settle, GatedSource};

fn picker(
    source: &Arc<GatedSource>,
) -> (
    SearchSelectController<GatedSource>,
    tokio::sync::mpsc::UnboundedReceiver<SelectionChange<u32>>,
) {
    SearchSelectController::new(Arc::clone(source), &PickerConfig::default())
}

fn query(q: &'static str) -> impl Fn(&Option<String>) -> bool {
    move |request| request.as_deref() == Some(q)
}

#[tokio::test(start_paused = true)]
async fn test_burst_issues_one_search_with_final_text() {
    let source = Arc::new(GatedSource::default());
    let (picker, _changes) = picker(&source);

    for text in ["g", "go", "gog", "gogo"] {
        picker.on_query_text_changed(text);
        advance(50).await;
    }
    assert!(source.searches.requests().is_empty());

    advance(300).await;
    assert_eq!(source.searches.requests(), vec![Some("gogo".to_string())]);
    assert!(picker.state().is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_older_search_completing_last_is_ignored() {
    let source = Arc::new(GatedSource::default());
    let (picker, _changes) = picker(&source);

    picker.on_query_text_changed("g");
    advance(301).await;
    picker.on_query_text_changed("go");
    advance(301).await;
    assert_eq!(source.searches.requests().len(), 2);

    source
        .searches
        .release(query("go"), Ok(vec![candidate(3, "Nikolai Gogol"), candidate(4, "Ivan Goncharov")]));
    settle().await;
    picker.on_arrow_down();
    let before = picker.state();

    source.searches.release(
        query("g"),
        Ok(vec![candidate(1, "Maxim Gorky"), candidate(2, "Vasily Grossman"), candidate(3, "Nikolai Gogol")]),
    );
    settle().await;

    let after = picker.state();
    assert_eq!(after.results, before.results);
    assert_eq!(after.highlighted_index, 1);
    assert!(!after.is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_loading_stays_on_until_latest_search_lands() {
    let source = Arc::new(GatedSource::default());
    let (picker, _changes) = picker(&source);

    picker.on_query_text_changed("t");
    advance(301).await;
    picker.on_query_text_changed("to");
    advance(301).await;

    source.searches.release(query("t"), Ok(vec![candidate(1, "Leo Tolstoy")]));
    settle().await;
    assert!(picker.state().is_loading);
    assert!(picker.state().results.is_empty());

    source.searches.release(query("to"), Ok(vec![candidate(1, "Leo Tolstoy")]));
    settle().await;
    assert!(!picker.state().is_loading);
    assert_eq!(picker.state().results.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_latest_external_value_wins_when_lookups_finish_in_order() {
    let source = Arc::new(GatedSource::default());
    let (picker, _changes) = picker(&source);

    picker.on_external_value_changed(Some(42));
    picker.on_external_value_changed(Some(7));
    settle().await;
    assert_eq!(source.lookups.requests(), vec![42, 7]);

    source.lookups.release(|id| *id == 42, Ok(Some(candidate(42, "Ivan Bunin"))));
    settle().await;
    assert_eq!(picker.state().selected, None);

    source.lookups.release(|id| *id == 7, Ok(Some(candidate(7, "Anton Chekhov"))));
    settle().await;
    assert_eq!(picker.state().selected, Some(candidate(7, "Anton Chekhov")));
    assert_eq!(picker.state().display_text(), "Anton Chekhov");
}

#[tokio::test(start_paused = true)]
async fn test_latest_external_value_wins_when_lookups_finish_reversed() {
    let source = Arc::new(GatedSource::default());
    let (picker, _changes) = picker(&source);

    picker.on_external_value_changed(Some(42));
    picker.on_external_value_changed(Some(7));
    settle().await;

    source.lookups.release(|id| *id == 7, Ok(Some(candidate(7, "Anton Chekhov"))));
    settle().await;
    source.lookups.release(|id| *id == 42, Ok(Some(candidate(42, "Ivan Bunin"))));
    settle().await;

    let state = picker.state();
    assert_eq!(state.selected, Some(candidate(7, "Anton Chekhov")));
    assert_eq!(state.external_value, Some(7));
}

#[tokio::test(start_paused = true)]
async fn test_pick_during_lookup_keeps_the_pick() {
    let source = Arc::new(GatedSource::default());
    let (picker, mut changes) = picker(&source);

    picker.on_external_value_changed(Some(42));
    settle().await;
    picker.on_select_candidate(candidate(9, "Ivan Turgenev"));
    assert_eq!(changes.try_recv().unwrap(), SelectionChange::Selected(9));

    source.lookups.release(|id| *id == 42, Ok(Some(candidate(42, "Ivan Bunin"))));
    settle().await;

    assert_eq!(picker.state().selected, Some(candidate(9, "Ivan Turgenev")));
}

#[tokio::test(start_paused = true)]
async fn test_dispose_ignores_in_flight_search() {
    let source = Arc::new(GatedSource::default());
    let (picker, mut changes) = picker(&source);

    picker.on_query_text_changed("pu");
    advance(301).await;
    picker.dispose();
    source.searches.release(query("pu"), Ok(vec![candidate(5, "Alexander Pushkin")]));
    settle().await;

    let state = picker.state();
    assert!(state.is_disposed());
    assert!(state.results.is_empty());
    assert!(changes.try_recv().is_err());
}
