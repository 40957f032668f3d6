//! Typed custom-field selection requests and their validation
//!
//! Requests arrive as a list of tagged entries, one per field:
//!
//! ```json
//! { "custom_fields": [
//!     { "kind": "value", "field_id": "…", "value_id": "…",
//!       "linked": [ { "field_id": "…", "value_ids": ["…"] } ] },
//!     { "kind": "cleared", "field_id": "…" }
//! ] }
//! ```
//!
//! Validation checks every id against the catalog and produces the flat
//! id sets stored on a [`Position`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Catalog, DomainError, Position};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub custom_fields: Vec<FieldSelection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldSelection {
    /// Choose `value_id` for `field_id`, plus linked values it unlocks.
    Value {
        field_id: Uuid,
        value_id: Uuid,
        #[serde(default)]
        linked: Vec<LinkedSelection>,
    },
    /// Explicitly leave `field_id` without a value.
    Cleared { field_id: Uuid },
}

impl FieldSelection {
    pub fn field_id(&self) -> Uuid {
        match self {
            FieldSelection::Value { field_id, .. } | FieldSelection::Cleared { field_id } => {
                *field_id
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkedSelection {
    pub field_id: Uuid,
    pub value_ids: Vec<Uuid>,
}

/// Validated id sets, ready to be stored on a position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub field_ids: Vec<Uuid>,
    pub value_ids: Vec<Uuid>,
}

impl Selection {
    /// Replace `position`'s selection with this one.
    pub fn apply(self, mut position: Position) -> Position {
        position.field_ids = self.field_ids;
        position.value_ids = self.value_ids;
        position
    }
}

impl SelectionRequest {
    /// Check the request against `catalog`.
    ///
    /// Rejects unknown fields, values not owned by their field, a field
    /// selected twice, linked fields the chosen value does not declare and
    /// linked values outside the declared subset.
    pub fn validate(&self, catalog: &Catalog) -> Result<Selection, DomainError> {
        let mut seen = HashSet::new();
        let mut selection = Selection::default();

        for entry in &self.custom_fields {
            let field_id = entry.field_id();
            if catalog.field(field_id).is_none() {
                return Err(DomainError::UnknownField(field_id));
            }
            if !seen.insert(field_id) {
                return Err(DomainError::DuplicateField(field_id));
            }

            let FieldSelection::Value {
                value_id, linked, ..
            } = entry
            else {
                continue;
            };

            if catalog.owner_of(*value_id).map(|f| f.id) != Some(field_id) {
                return Err(DomainError::ValueNotInField {
                    field_id,
                    value_id: *value_id,
                });
            }
            selection.field_ids.push(field_id);
            push_unique(&mut selection.value_ids, *value_id);

            let declared = catalog.linked_fields(*value_id);
            for link in linked {
                let Some(target) = declared.iter().find(|d| d.id == link.field_id) else {
                    return Err(DomainError::LinkNotDeclared {
                        value_id: *value_id,
                        linked_field_id: link.field_id,
                    });
                };
                for linked_value in &link.value_ids {
                    if !target.values.iter().any(|v| v.id == *linked_value) {
                        return Err(DomainError::LinkedValueNotAllowed {
                            linked_field_id: link.field_id,
                            value_id: *linked_value,
                        });
                    }
                    push_unique(&mut selection.value_ids, *linked_value);
                }
            }
        }

        debug!(
            "validate: {} fields, {} values",
            selection.field_ids.len(),
            selection.value_ids.len()
        );
        Ok(selection)
    }
}

fn push_unique(ids: &mut Vec<Uuid>, id: Uuid) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}
