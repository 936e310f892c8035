//! Author model and related types

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{validate_not_blank, Entity};

/// Author as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
}

/// Create/update author request
#[derive(Debug, Clone, Serialize, Validate)]
pub struct AuthorDraft {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
}

impl AuthorDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
        }
    }
}

impl Entity for Author {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}
