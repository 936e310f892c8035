//! In-process collection with the same search and paging rules as the API

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        Author, AuthorDraft, Book, BookDraft, Cabinet, CabinetDraft, Entity, Page, PageRequest,
        Pagination, Shelf, ShelfDraft, Tag, TagDraft,
    },
    repository::PagedCollection,
};

/// Records that can be created and edited from a draft
pub trait Record: Entity<Id = Uuid> {
    type Draft: Send + Sync + 'static;

    fn from_draft(id: Uuid, draft: Self::Draft) -> Self;

    fn apply(&mut self, draft: Self::Draft);
}

impl Record for Author {
    type Draft = AuthorDraft;

    fn from_draft(id: Uuid, draft: AuthorDraft) -> Self {
        Author { id, name: draft.name }
    }

    fn apply(&mut self, draft: AuthorDraft) {
        self.name = draft.name;
    }
}

impl Record for Cabinet {
    type Draft = CabinetDraft;

    fn from_draft(id: Uuid, draft: CabinetDraft) -> Self {
        Cabinet { id, name: draft.name }
    }

    fn apply(&mut self, draft: CabinetDraft) {
        self.name = draft.name;
    }
}

impl Record for Tag {
    type Draft = TagDraft;

    fn from_draft(id: Uuid, draft: TagDraft) -> Self {
        Tag { id, name: draft.name }
    }

    fn apply(&mut self, draft: TagDraft) {
        self.name = draft.name;
    }
}

impl Record for Shelf {
    type Draft = ShelfDraft;

    fn from_draft(id: Uuid, draft: ShelfDraft) -> Self {
        Shelf {
            id,
            name: draft.name,
            cabinet_id: draft.cabinet_id,
            cabinet_name: None,
        }
    }

    fn apply(&mut self, draft: ShelfDraft) {
        if self.cabinet_id != draft.cabinet_id {
            self.cabinet_name = None;
        }
        self.name = draft.name;
        self.cabinet_id = draft.cabinet_id;
    }
}

impl Record for Book {
    type Draft = BookDraft;

    fn from_draft(id: Uuid, draft: BookDraft) -> Self {
        let mut book = Book {
            id,
            title: String::new(),
            short_description: None,
            full_description: None,
            author_id: None,
            shelf_id: None,
            tag_ids: Vec::new(),
            cover_path: None,
        };
        book.apply(draft);
        book
    }

    fn apply(&mut self, draft: BookDraft) {
        let text = |s: &str| crate::models::non_blank(s).map(str::to_string);
        self.title = draft.title.trim().to_string();
        self.short_description = text(&draft.short_description);
        self.full_description = text(&draft.full_description);
        self.author_id = draft.author_id;
        self.shelf_id = draft.shelf_id;
        self.tag_ids = draft.tag_ids;
    }
}

/// True when any word of `text` starts with `fragment`, ignoring case
pub fn word_starts_with(text: &str, fragment: &str) -> bool {
    let fragment = fragment.trim().to_lowercase();
    if fragment.is_empty() {
        return true;
    }
    text.split_whitespace()
        .any(|word| word.to_lowercase().starts_with(&fragment))
}

/// Collection kept in memory, ordered by display name
pub struct MemoryCollection<E> {
    records: Mutex<Vec<E>>,
}

impl<E: Record> Default for MemoryCollection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Record> MemoryCollection<E> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, record: E) {
        let mut records = self.lock();
        records.push(record);
        records.sort_by_key(|r| r.display_name().to_lowercase());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<E>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<E: Record> PagedCollection for MemoryCollection<E> {
    type Id = Uuid;
    type Entity = E;
    type Draft = E::Draft;

    async fn list_page(&self, request: PageRequest) -> AppResult<Page<E>> {
        let records = self.lock();
        let matching: Vec<&E> = records
            .iter()
            .filter(|r| {
                request
                    .search
                    .as_deref()
                    .map_or(true, |q| word_starts_with(r.display_name(), q))
            })
            .collect();
        let pagination = Pagination::from_total(matching.len(), &request);
        let clamped = PageRequest {
            page: pagination.current_page,
            ..request
        };
        let items = matching
            .into_iter()
            .skip(clamped.offset())
            .take(clamped.per_page as usize)
            .cloned()
            .collect();
        Ok(Page { items, pagination })
    }

    async fn get(&self, id: &Uuid) -> AppResult<Option<E>> {
        Ok(self.lock().iter().find(|r| r.id() == id).cloned())
    }

    async fn create(&self, draft: E::Draft) -> AppResult<E> {
        let record = E::from_draft(Uuid::new_v4(), draft);
        self.insert(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &Uuid, draft: E::Draft) -> AppResult<E> {
        let mut records = self.lock();
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("{} not found", id)))?;
        record.apply(draft);
        let updated = record.clone();
        records.sort_by_key(|r| r.display_name().to_lowercase());
        Ok(updated)
    }

    async fn delete(&self, id: &Uuid) -> AppResult<()> {
        let mut records = self.lock();
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(AppError::NotFound(format!("{} not found", id)));
        }
        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<E>> {
        Ok(self.lock().clone())
    }
}
