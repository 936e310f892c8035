//! Shelf model and grouping helpers

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{validate_not_blank, Cabinet, Entity};

/// Shelf with the name of the cabinet it stands in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelf {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub cabinet_id: Option<Uuid>,
    #[serde(default)]
    pub cabinet_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct ShelfDraft {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    pub cabinet_id: Option<Uuid>,
}

impl ShelfDraft {
    pub fn new(name: impl Into<String>, cabinet_id: Option<Uuid>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            cabinet_id,
        }
    }
}

impl Entity for Shelf {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// Shelves belonging to one cabinet; `cabinet` is `None` for the
/// trailing group of shelves without a (known) cabinet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CabinetGroup {
    pub cabinet: Option<Cabinet>,
    pub shelves: Vec<Shelf>,
}

/// Groups shelves by cabinet, keeping cabinet order
pub fn group_by_cabinet(shelves: &[Shelf], cabinets: &[Cabinet]) -> Vec<CabinetGroup> {
    let mut groups: Vec<CabinetGroup> = cabinets
        .iter()
        .map(|cabinet| CabinetGroup {
            cabinet: Some(cabinet.clone()),
            shelves: shelves
                .iter()
                .filter(|s| s.cabinet_id == Some(cabinet.id))
                .cloned()
                .collect(),
        })
        .collect();

    let orphans: Vec<Shelf> = shelves
        .iter()
        .filter(|s| match s.cabinet_id {
            Some(id) => !cabinets.iter().any(|c| c.id == id),
            None => true,
        })
        .cloned()
        .collect();
    if !orphans.is_empty() {
        groups.push(CabinetGroup {
            cabinet: None,
            shelves: orphans,
        });
    }
    groups
}
