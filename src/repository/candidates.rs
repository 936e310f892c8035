//! Adapter exposing any paged collection as a picker source

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Candidate, PageRequest},
    repository::{CandidateSource, PagedCollection},
};

/// Searches a collection's first page and maps records to candidates
pub struct CollectionCandidates<C: ?Sized> {
    collection: Arc<C>,
}

impl<C: ?Sized> CollectionCandidates<C> {
    pub fn new(collection: Arc<C>) -> Self {
        Self { collection }
    }
}

impl<C: ?Sized> Clone for CollectionCandidates<C> {
    fn clone(&self) -> Self {
        Self {
            collection: Arc::clone(&self.collection),
        }
    }
}

#[async_trait]
impl<C> CandidateSource for CollectionCandidates<C>
where
    C: PagedCollection + ?Sized,
{
    type Id = C::Id;

    async fn search(
        &self,
        query: Option<String>,
        limit: usize,
    ) -> AppResult<Vec<Candidate<Self::Id>>> {
        let per_page = u32::try_from(limit).unwrap_or(u32::MAX);
        let page = self
            .collection
            .list_page(PageRequest::new(1, per_page, query.as_deref()))
            .await?;
        Ok(page.items.iter().map(Candidate::from).collect())
    }

    async fn lookup_by_id(&self, id: &Self::Id) -> AppResult<Option<Candidate<Self::Id>>> {
        let entity = self.collection.get(id).await?;
        Ok(entity.as_ref().map(Candidate::from))
    }
}
