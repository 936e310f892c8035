//! Data models for the catalog console

pub mod author;
pub mod book;
pub mod cabinet;
pub mod candidate;
pub mod pagination;
pub mod shelf;
pub mod tag;

use std::fmt::{Debug, Display};

// Re-export commonly used types
pub use author::{Author, AuthorDraft};
pub use book::{Book, BookDraft};
pub use cabinet::{Cabinet, CabinetDraft};
pub use candidate::Candidate;
pub use pagination::{Page, PageRequest, Pagination};
pub use shelf::{group_by_cabinet, CabinetGroup, Shelf, ShelfDraft};
pub use tag::{Tag, TagDraft};

/// A record held by a paged collection
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Id: Clone + Eq + Debug + Display + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;

    /// Label shown in lists and pickers
    fn display_name(&self) -> &str;
}

/// Trims and maps blank strings to `None`
pub(crate) fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

pub(crate) fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if non_blank(value).is_some() {
        Ok(())
    } else {
        Err(validator::ValidationError::new("blank"))
    }
}
