//! Minimal search result used by pickers

use serde::{Deserialize, Serialize};

use super::Entity;

/// Identifier plus label, not the full record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate<Id> {
    pub id: Id,
    pub display_name: String,
}

impl<Id> Candidate<Id> {
    pub fn new(id: Id, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

impl<E: Entity> From<&E> for Candidate<E::Id> {
    fn from(entity: &E) -> Self {
        Candidate::new(entity.id().clone(), entity.display_name())
    }
}
