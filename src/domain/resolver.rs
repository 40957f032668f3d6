//! Resolution of a position's raw selection into field entries.

use std::collections::HashSet;

use itertools::Itertools;
use tracing::trace;
use uuid::Uuid;

use crate::domain::catalog::{Catalog, LinkedField, LinkedValue};
use crate::domain::error::Diagnostic;
use crate::domain::position::{Position, ResolvedField, ResolvedPosition};

/// Ordered resolved fields plus whatever was skipped on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub fields: Vec<ResolvedField>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolves selections against a [`Catalog`].
///
/// Never fails: unknown ids and fields without a value are skipped and
/// reported as diagnostics.
pub struct FieldResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> FieldResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Resolve `field_ids` in order, picking each field's value from `value_ids`.
    ///
    /// A field whose value declares linked fields gets those linked fields
    /// back, restricted to the linked values that are also selected. Linked
    /// fields with no selected value are left out entirely.
    pub fn resolve(&self, field_ids: &[Uuid], value_ids: &[Uuid]) -> Resolution {
        let mut diagnostics = Vec::new();
        // repeated ids in stored selections count once
        let value_ids: Vec<Uuid> = value_ids.iter().copied().unique().collect();
        let selected: HashSet<Uuid> = value_ids.iter().copied().collect();

        for value_id in &value_ids {
            if self.catalog.owner_of(*value_id).is_none() {
                diagnostics.push(Diagnostic::UnknownValue {
                    value_id: *value_id,
                });
            }
        }

        let mut fields = Vec::new();
        let mut seen = HashSet::new();
        for field_id in field_ids {
            if !seen.insert(*field_id) {
                continue;
            }
            let Some(field) = self.catalog.field(*field_id) else {
                diagnostics.push(Diagnostic::UnknownField {
                    field_id: *field_id,
                });
                continue;
            };

            let candidates: Vec<Uuid> = value_ids
                .iter()
                .copied()
                .filter(|v| self.catalog.owner_of(*v).map(|f| f.id) == Some(field.id))
                .collect();
            let Some((&chosen, rest)) = candidates.split_first() else {
                diagnostics.push(Diagnostic::MissingValue { field_id: field.id });
                continue;
            };
            if !rest.is_empty() {
                diagnostics.push(Diagnostic::AmbiguousValue {
                    field_id: field.id,
                    kept: chosen,
                    dropped: rest.to_vec(),
                });
            }

            let Some(value) = self.catalog.value(chosen) else {
                continue;
            };
            let linked = self.selected_links(chosen, &selected);
            trace!(
                "resolve: {}={} ({} linked)",
                field.key,
                value.text,
                linked.len()
            );
            fields.push(ResolvedField {
                field_id: field.id,
                key: field.key.clone(),
                label: field.label.clone(),
                value_id: chosen,
                value: value.text.clone(),
                linked,
            });
        }

        Resolution {
            fields,
            diagnostics,
        }
    }

    fn selected_links(&self, value_id: Uuid, selected: &HashSet<Uuid>) -> Vec<LinkedField> {
        self.catalog
            .linked_fields(value_id)
            .iter()
            .filter_map(|link| {
                let values: Vec<LinkedValue> = link
                    .values
                    .iter()
                    .filter(|v| selected.contains(&v.id))
                    .cloned()
                    .collect();
                (!values.is_empty()).then(|| LinkedField {
                    values,
                    ..link.clone()
                })
            })
            .collect()
    }

    /// Resolve a stored position into the map the tree builder consumes.
    pub fn resolve_position(&self, position: &Position) -> (ResolvedPosition, Vec<Diagnostic>) {
        let resolution = self.resolve(&position.field_ids, &position.value_ids);
        (
            ResolvedPosition::new(position, resolution.fields),
            resolution.diagnostics,
        )
    }
}
