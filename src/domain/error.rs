//! Domain-level errors and diagnostics (no external dependencies)

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Domain errors represent rejected input at the validation boundary.
///
/// The resolver and tree builder never produce these: they degrade
/// gracefully and report what they skipped as [`Diagnostic`]s instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown custom field: {0}")]
    UnknownField(Uuid),

    #[error("value {value_id} does not belong to custom field {field_id}")]
    ValueNotInField { field_id: Uuid, value_id: Uuid },

    #[error("custom field selected more than once: {0}")]
    DuplicateField(Uuid),

    #[error("field {linked_field_id} is not linked from value {value_id}")]
    LinkNotDeclared { value_id: Uuid, linked_field_id: Uuid },

    #[error("value {value_id} is not a legal choice for linked field {linked_field_id}")]
    LinkedValueNotAllowed {
        linked_field_id: Uuid,
        value_id: Uuid,
    },
}

/// Something that could not be resolved while reading otherwise well-formed data.
///
/// Diagnostics are informational: they never change the shape of a resolved
/// field list or a built tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A selected field id is not in the catalog.
    UnknownField { field_id: Uuid },
    /// A selected value id is not owned by any catalog field.
    UnknownValue { value_id: Uuid },
    /// A field was selected, but none of the selected values belong to it.
    MissingValue { field_id: Uuid },
    /// Several selected values belong to one field; `kept` won.
    AmbiguousValue {
        field_id: Uuid,
        kept: Uuid,
        dropped: Vec<Uuid>,
    },
    /// A link declaration on `value_id` points at a field or value the catalog does not know.
    DanglingLink { value_id: Uuid, target_id: Uuid },
    /// A value id is listed by more than one field; `owner` keeps it.
    DuplicateValue {
        value_id: Uuid,
        owner: Uuid,
        ignored: Uuid,
    },
    /// A tree level groups by a key no catalog field has.
    UnknownLevelField { field_key: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownField { field_id } => write!(f, "unknown field {field_id}"),
            Diagnostic::UnknownValue { value_id } => write!(f, "unknown value {value_id}"),
            Diagnostic::MissingValue { field_id } => {
                write!(f, "field {field_id} selected without a value")
            }
            Diagnostic::AmbiguousValue {
                field_id,
                kept,
                dropped,
            } => write!(
                f,
                "field {field_id} has {} values, kept {kept}",
                dropped.len() + 1
            ),
            Diagnostic::DanglingLink {
                value_id,
                target_id,
            } => write!(f, "value {value_id} links to unknown {target_id}"),
            Diagnostic::DuplicateValue {
                value_id,
                owner,
                ignored,
            } => write!(
                f,
                "value {value_id} listed by {owner} and {ignored}, kept {owner}"
            ),
            Diagnostic::UnknownLevelField { field_key } => {
                write!(f, "tree level groups by unknown field key '{field_key}'")
            }
        }
    }
}
