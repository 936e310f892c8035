//! Catalog Console
//!
//! Controllers for a book catalog front end: a debounced, race-safe
//! search-and-select picker and paginated lists with live search, wired to
//! the catalog REST API or to an in-memory catalog.

use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod repository;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use controllers::{PagedListController, SearchSelectController, SelectionChange};
use models::{
    group_by_cabinet, Author, AuthorDraft, Book, BookDraft, Cabinet, CabinetDraft, CabinetGroup,
    Shelf, ShelfDraft, Tag, TagDraft,
};
use repository::{Catalog, CollectionCandidates, PagedCollection};

type Collection<E, D> = dyn PagedCollection<Id = Uuid, Entity = E, Draft = D>;

/// Picker over the author collection
pub type AuthorPicker = SearchSelectController<CollectionCandidates<Collection<Author, AuthorDraft>>>;

/// Shared entry point handing out controllers bound to one catalog
#[derive(Clone)]
pub struct Console {
    pub config: Arc<AppConfig>,
    pub catalog: Catalog,
}

impl Console {
    pub fn new(config: AppConfig, catalog: Catalog) -> Self {
        Self {
            config: Arc::new(config),
            catalog,
        }
    }

    /// Console talking to the API configured in `config.api`
    pub fn http(config: AppConfig) -> AppResult<Self> {
        let catalog = Catalog::http(&config.api)?;
        Ok(Self::new(config, catalog))
    }

    pub fn author_picker(&self) -> (AuthorPicker, mpsc::UnboundedReceiver<SelectionChange<Uuid>>) {
        let source = CollectionCandidates::new(Arc::clone(&self.catalog.authors));
        SearchSelectController::new(Arc::new(source), &self.config.picker)
    }

    pub fn authors(&self) -> PagedListController<Arc<Collection<Author, AuthorDraft>>> {
        self.list(&self.catalog.authors)
    }

    pub fn books(&self) -> PagedListController<Arc<Collection<Book, BookDraft>>> {
        self.list(&self.catalog.books)
    }

    pub fn shelves(&self) -> PagedListController<Arc<Collection<Shelf, ShelfDraft>>> {
        self.list(&self.catalog.shelves)
    }

    pub fn cabinets(&self) -> PagedListController<Arc<Collection<Cabinet, CabinetDraft>>> {
        self.list(&self.catalog.cabinets)
    }

    pub fn tags(&self) -> PagedListController<Arc<Collection<Tag, TagDraft>>> {
        self.list(&self.catalog.tags)
    }

    /// Every shelf under its cabinet; shelves without a known cabinet last
    pub async fn shelves_by_cabinet(&self) -> AppResult<Vec<CabinetGroup>> {
        let (shelves, cabinets) = tokio::try_join!(
            self.catalog.shelves.list_all(),
            self.catalog.cabinets.list_all()
        )?;
        Ok(group_by_cabinet(&shelves, &cabinets))
    }

    fn list<C: PagedCollection + ?Sized>(&self, collection: &Arc<C>) -> PagedListController<Arc<C>> {
        PagedListController::new(Arc::clone(collection), &self.config.list)
    }
}
