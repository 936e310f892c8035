//! Data access layer consumed by the controllers
//!
//! The controllers never talk to the network directly; they are handed a
//! [`CandidateSource`] or a [`PagedCollection`]. [`http`] implements the latter
//! against the catalog REST API and [`memory`] keeps records in process.

pub mod candidates;
pub mod http;
pub mod memory;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::fmt::{Debug, Display};
use std::sync::Arc;

use crate::{
    config::ApiConfig,
    error::AppResult,
    models::{
        Author, AuthorDraft, Book, BookDraft, Cabinet, CabinetDraft, Candidate, Entity, Page,
        PageRequest, Shelf, ShelfDraft, Tag, TagDraft,
    },
};

pub use candidates::CollectionCandidates;
pub use http::{ApiClient, HttpCollection, Resource};
pub use memory::MemoryCollection;

/// Remote search used by the search-select controller
#[cfg_attr(test, automock(type Id = String;))]
#[async_trait]
pub trait CandidateSource: Send + Sync + 'static {
    type Id: Clone + Eq + Debug + Display + Send + Sync + 'static;

    /// Searches candidates; `query` is `None` for "no filter"
    async fn search(
        &self,
        query: Option<String>,
        limit: usize,
    ) -> AppResult<Vec<Candidate<Self::Id>>>;

    /// Resolves the label of an already selected id
    async fn lookup_by_id(&self, id: &Self::Id) -> AppResult<Option<Candidate<Self::Id>>>;
}

/// Remote paged, filterable collection with mutations
#[cfg_attr(
    test,
    automock(type Id = uuid::Uuid; type Entity = crate::models::Tag; type Draft = crate::models::TagDraft;)
)]
#[async_trait]
pub trait PagedCollection: Send + Sync + 'static {
    type Id: Clone + Eq + Debug + Display + Send + Sync + 'static;
    type Entity: Entity<Id = Self::Id>;
    type Draft: Send + Sync + 'static;

    async fn list_page(&self, request: PageRequest) -> AppResult<Page<Self::Entity>>;

    /// Fetches one record; `Ok(None)` when it does not exist
    async fn get(&self, id: &Self::Id) -> AppResult<Option<Self::Entity>>;

    async fn create(&self, draft: Self::Draft) -> AppResult<Self::Entity>;

    async fn update(&self, id: &Self::Id, draft: Self::Draft) -> AppResult<Self::Entity>;

    async fn delete(&self, id: &Self::Id) -> AppResult<()>;

    /// Every record, unpaged; fills option lists
    async fn list_all(&self) -> AppResult<Vec<Self::Entity>>;
}

#[async_trait]
impl<T: PagedCollection + ?Sized> PagedCollection for Arc<T> {
    type Id = T::Id;
    type Entity = T::Entity;
    type Draft = T::Draft;

    async fn list_page(&self, request: PageRequest) -> AppResult<Page<Self::Entity>> {
        (**self).list_page(request).await
    }

    async fn get(&self, id: &Self::Id) -> AppResult<Option<Self::Entity>> {
        (**self).get(id).await
    }

    async fn create(&self, draft: Self::Draft) -> AppResult<Self::Entity> {
        (**self).create(draft).await
    }

    async fn update(&self, id: &Self::Id, draft: Self::Draft) -> AppResult<Self::Entity> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: &Self::Id) -> AppResult<()> {
        (**self).delete(id).await
    }

    async fn list_all(&self) -> AppResult<Vec<Self::Entity>> {
        (**self).list_all().await
    }
}

/// One collection per catalog resource
#[derive(Clone)]
pub struct Catalog {
    pub authors: Arc<dyn PagedCollection<Id = uuid::Uuid, Entity = Author, Draft = AuthorDraft>>,
    pub books: Arc<dyn PagedCollection<Id = uuid::Uuid, Entity = Book, Draft = BookDraft>>,
    pub shelves: Arc<dyn PagedCollection<Id = uuid::Uuid, Entity = Shelf, Draft = ShelfDraft>>,
    pub cabinets: Arc<dyn PagedCollection<Id = uuid::Uuid, Entity = Cabinet, Draft = CabinetDraft>>,
    pub tags: Arc<dyn PagedCollection<Id = uuid::Uuid, Entity = Tag, Draft = TagDraft>>,
}

impl Catalog {
    /// Catalog backed by the REST API
    pub fn http(config: &ApiConfig) -> AppResult<Self> {
        let client = ApiClient::new(config)?;
        Ok(Self {
            authors: Arc::new(HttpCollection::<Author>::new(client.clone())),
            books: Arc::new(HttpCollection::<Book>::new(client.clone())),
            shelves: Arc::new(HttpCollection::<Shelf>::new(client.clone())),
            cabinets: Arc::new(HttpCollection::<Cabinet>::new(client.clone())),
            tags: Arc::new(HttpCollection::<Tag>::new(client)),
        })
    }

    /// Catalog held in memory, optionally seeded with authors
    pub fn in_memory(seed_authors: &[&str]) -> Self {
        let authors = MemoryCollection::<Author>::new();
        for name in seed_authors {
            authors.insert(Author {
                id: uuid::Uuid::new_v4(),
                name: name.to_string(),
            });
        }
        Self {
            authors: Arc::new(authors),
            books: Arc::new(MemoryCollection::<Book>::new()),
            shelves: Arc::new(MemoryCollection::<Shelf>::new()),
            cabinets: Arc::new(MemoryCollection::<Cabinet>::new()),
            tags: Arc::new(MemoryCollection::<Tag>::new()),
        }
    }
}
