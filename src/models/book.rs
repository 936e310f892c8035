//! Book model and related types

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{non_blank, validate_not_blank, Entity};

/// Book as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub full_description: Option<String>,
    #[serde(default)]
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub shelf_id: Option<Uuid>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
    #[serde(default)]
    pub cover_path: Option<String>,
}

/// Create/update book request
///
/// The books endpoints take form fields rather than JSON; see
/// [`BookDraft::form_fields`].
#[derive(Debug, Clone, Default, Validate)]
pub struct BookDraft {
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,
    pub short_description: String,
    pub full_description: String,
    pub author_id: Option<Uuid>,
    pub shelf_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
}

impl BookDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Form encoding expected by the server: trimmed text, empty string
    /// for absent references, tag ids comma-joined
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let opt_id = |id: Option<Uuid>| id.map(|id| id.to_string()).unwrap_or_default();
        vec![
            ("title", self.title.trim().to_string()),
            (
                "short_description",
                non_blank(&self.short_description).unwrap_or_default().to_string(),
            ),
            (
                "full_description",
                non_blank(&self.full_description).unwrap_or_default().to_string(),
            ),
            ("author_id", opt_id(self.author_id)),
            ("shelf_id", opt_id(self.shelf_id)),
            (
                "tag_ids",
                self.tag_ids
                    .iter()
                    .map(Uuid::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        ]
    }
}

impl Entity for Book {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }
}
