//! Read-only snapshot of custom field definitions.
//!
//! A [`Catalog`] is built once per request from the stored definitions and
//! answers the membership questions the resolver and tree builder ask:
//! which field owns a value, what a value's text is, and which linked fields
//! a value unlocks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::error::Diagnostic;

/// Administrator-defined attribute type, e.g. "Department".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: Uuid,
    /// Stable machine name, used as the grouping key
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub values: Vec<AllowedValue>,
}

/// One legal value of a custom field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedValue {
    pub id: Uuid,
    pub text: String,
    /// Fields unlocked when this value is chosen, as stored
    #[serde(default)]
    pub links: Vec<LinkDeclaration>,
}

/// Stored link from an allowed value to another field and a subset of its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDeclaration {
    pub field_id: Uuid,
    #[serde(default)]
    pub value_ids: Vec<Uuid>,
}

/// A link declaration resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkedField {
    pub id: Uuid,
    pub key: String,
    pub label: String,
    pub values: Vec<LinkedValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkedValue {
    pub id: Uuid,
    pub text: String,
}

impl CustomField {
    pub fn new(id: Uuid, key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
            label: label.into(),
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: AllowedValue) -> Self {
        self.values.push(value);
        self
    }
}

impl AllowedValue {
    pub fn new(id: Uuid, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            links: Vec::new(),
        }
    }

    pub fn linking(mut self, field_id: Uuid, value_ids: &[Uuid]) -> Self {
        self.links.push(LinkDeclaration {
            field_id,
            value_ids: value_ids.to_vec(),
        });
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct ValueSlot {
    field: usize,
    value: usize,
}

/// Indexed, immutable view over all custom field definitions.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    fields: Vec<CustomField>,
    by_id: HashMap<Uuid, usize>,
    by_key: HashMap<String, usize>,
    values: HashMap<Uuid, ValueSlot>,
    linked: HashMap<Uuid, Vec<LinkedField>>,
    diagnostics: Vec<Diagnostic>,
}

impl Catalog {
    /// Index `fields` and resolve every link declaration.
    ///
    /// Fields keep their given order. When a value id is listed by two
    /// fields the earlier field owns it; when two fields share a key the
    /// earlier one answers key lookups.
    pub fn new(fields: Vec<CustomField>) -> Self {
        let mut catalog = Self {
            fields,
            ..Self::default()
        };

        for (fi, field) in catalog.fields.iter().enumerate() {
            catalog.by_id.entry(field.id).or_insert(fi);
            catalog.by_key.entry(field.key.clone()).or_insert(fi);
            for (vi, value) in field.values.iter().enumerate() {
                match catalog.values.get(&value.id) {
                    Some(slot) => catalog.diagnostics.push(Diagnostic::DuplicateValue {
                        value_id: value.id,
                        owner: catalog.fields[slot.field].id,
                        ignored: field.id,
                    }),
                    None => {
                        catalog.values.insert(
                            value.id,
                            ValueSlot {
                                field: fi,
                                value: vi,
                            },
                        );
                    }
                }
            }
        }

        let mut linked = HashMap::new();
        let mut dangling = Vec::new();
        for field in &catalog.fields {
            for value in &field.values {
                let resolved = catalog.resolve_links(value, &mut dangling);
                if !resolved.is_empty() {
                    linked.entry(value.id).or_insert(resolved);
                }
            }
        }
        catalog.linked = linked;
        catalog.diagnostics.extend(dangling);

        for diagnostic in &catalog.diagnostics {
            warn!("catalog: {}", diagnostic);
        }
        debug!(
            "catalog: {} fields, {} values, {} values with links",
            catalog.fields.len(),
            catalog.values.len(),
            catalog.linked.len()
        );
        catalog
    }

    fn resolve_links(&self, value: &AllowedValue, dangling: &mut Vec<Diagnostic>) -> Vec<LinkedField> {
        let mut resolved = Vec::new();
        for link in &value.links {
            let Some(target) = self.field(link.field_id) else {
                dangling.push(Diagnostic::DanglingLink {
                    value_id: value.id,
                    target_id: link.field_id,
                });
                continue;
            };

            let mut values = Vec::new();
            for value_id in &link.value_ids {
                match self.owned_value(target.id, *value_id) {
                    Some(allowed) => values.push(LinkedValue {
                        id: allowed.id,
                        text: allowed.text.clone(),
                    }),
                    None => dangling.push(Diagnostic::DanglingLink {
                        value_id: value.id,
                        target_id: *value_id,
                    }),
                }
            }

            if values.is_empty() {
                continue;
            }
            resolved.push(LinkedField {
                id: target.id,
                key: target.key.clone(),
                label: target.label.clone(),
                values,
            });
        }
        resolved
    }

    fn owned_value(&self, field_id: Uuid, value_id: Uuid) -> Option<&AllowedValue> {
        let slot = self.values.get(&value_id)?;
        let field = &self.fields[slot.field];
        (field.id == field_id).then(|| &field.values[slot.value])
    }

    pub fn fields(&self) -> &[CustomField] {
        &self.fields
    }

    pub fn field(&self, id: Uuid) -> Option<&CustomField> {
        self.by_id.get(&id).map(|&i| &self.fields[i])
    }

    pub fn field_by_key(&self, key: &str) -> Option<&CustomField> {
        self.by_key.get(key).map(|&i| &self.fields[i])
    }

    pub fn value(&self, id: Uuid) -> Option<&AllowedValue> {
        self.values
            .get(&id)
            .map(|slot| &self.fields[slot.field].values[slot.value])
    }

    /// The field whose value set contains `value_id`.
    pub fn owner_of(&self, value_id: Uuid) -> Option<&CustomField> {
        self.values.get(&value_id).map(|slot| &self.fields[slot.field])
    }

    /// Linked fields unlocked by `value_id`; empty when it declares none.
    pub fn linked_fields(&self, value_id: Uuid) -> &[LinkedField] {
        self.linked
            .get(&value_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_links(&self, value_id: Uuid) -> bool {
        self.linked.contains_key(&value_id)
    }

    /// Problems found while indexing (duplicate value owners, dangling links).
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_link_to_foreign_value_is_dropped() {
        let specialization = CustomField::new(id(2), "specialization", "Specialization")
            .with_value(AllowedValue::new(id(20), "Backend"));
        let other = CustomField::new(id(3), "office", "Office")
            .with_value(AllowedValue::new(id(30), "Berlin"));
        let seniority = CustomField::new(id(1), "seniority", "Seniority")
            .with_value(AllowedValue::new(id(10), "Senior").linking(id(2), &[id(20), id(30)]));

        let catalog = Catalog::new(vec![seniority, specialization, other]);

        let linked = catalog.linked_fields(id(10));
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].values.len(), 1);
        assert_eq!(linked[0].values[0].text, "Backend");
        assert_eq!(
            catalog.diagnostics(),
            &[Diagnostic::DanglingLink {
                value_id: id(10),
                target_id: id(30)
            }]
        );
    }

    #[test]
    fn test_duplicate_value_keeps_first_owner() {
        let a = CustomField::new(id(1), "a", "A").with_value(AllowedValue::new(id(9), "x"));
        let b = CustomField::new(id(2), "b", "B").with_value(AllowedValue::new(id(9), "y"));

        let catalog = Catalog::new(vec![a, b]);

        assert_eq!(catalog.owner_of(id(9)).map(|f| f.id), Some(id(1)));
        assert_eq!(catalog.value(id(9)).map(|v| v.text.as_str()), Some("x"));
        assert_eq!(catalog.diagnostics().len(), 1);
    }
}
