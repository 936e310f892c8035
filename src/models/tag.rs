//! Tag model

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{validate_not_blank, Entity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct TagDraft {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
}

impl TagDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
        }
    }
}

impl Entity for Tag {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}
