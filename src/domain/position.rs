//! Positions and their resolved custom field maps

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::catalog::LinkedField;

/// A job position with its raw custom field selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub employee_full_name: Option<String>,
    /// Top-level fields chosen for this position
    #[serde(default)]
    pub field_ids: Vec<Uuid>,
    /// Chosen value for each selected field, plus any chosen linked values
    #[serde(default)]
    pub value_ids: Vec<Uuid>,
}

impl Position {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            employee_full_name: None,
            field_ids: Vec::new(),
            value_ids: Vec::new(),
        }
    }

    /// Select `value_id` for the top-level field `field_id`.
    pub fn select(mut self, field_id: Uuid, value_id: Uuid) -> Self {
        if !self.field_ids.contains(&field_id) {
            self.field_ids.push(field_id);
        }
        self.value_ids.push(value_id);
        self
    }

    /// Select a linked value (no top-level field entry).
    pub fn select_linked(mut self, value_id: Uuid) -> Self {
        self.value_ids.push(value_id);
        self
    }
}

/// One selected field with its chosen value and the linked values chosen under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedField {
    pub field_id: Uuid,
    pub key: String,
    pub label: String,
    pub value_id: Uuid,
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked: Vec<LinkedField>,
}

/// A position together with its resolved custom field map, keyed by field key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPosition {
    pub id: i64,
    pub name: String,
    pub employee_full_name: Option<String>,
    pub fields: BTreeMap<String, ResolvedField>,
}

impl ResolvedPosition {
    /// Build the map from an ordered resolved list; the first entry per key wins.
    pub fn new(position: &Position, resolved: Vec<ResolvedField>) -> Self {
        let mut fields = BTreeMap::new();
        for field in resolved {
            fields.entry(field.key.clone()).or_insert(field);
        }
        Self {
            id: position.id,
            name: position.name.clone(),
            employee_full_name: position.employee_full_name.clone(),
            fields,
        }
    }

    /// Value text for `key`. An empty text counts as unset.
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|f| f.value.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn field(&self, key: &str) -> Option<&ResolvedField> {
        self.fields.get(key)
    }
}
