//! Tree builder: partitions resolved positions into a hierarchy of value groups.

use std::collections::BTreeMap;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::domain::catalog::{Catalog, LinkedField};
use crate::domain::error::Diagnostic;
use crate::domain::position::ResolvedPosition;
use crate::domain::tree::{GroupNode, TreeLevel, TreeNode};

/// Label of the root bucket holding positions with no value for any level field.
pub const OUT_OF_STRUCTURE_LABEL: &str = "out of structure";

/// Separator between a value and its linked values in combined group labels.
const LINKED_SEPARATOR: &str = " - ";

/// Accumulated `field key = value` constraints from the root down to a branch.
///
/// Extending returns a new list; a parent's constraints are never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathConstraints {
    pairs: Vec<(String, String)>,
}

impl PathConstraints {
    pub fn with(&self, key: &str, value: &str) -> Self {
        let mut pairs = self.pairs.clone();
        pairs.retain(|(k, _)| k != key);
        pairs.push((key.to_string(), value.to_string()));
        Self { pairs }
    }

    pub fn matches(&self, position: &ResolvedPosition) -> bool {
        self.pairs
            .iter()
            .all(|(key, value)| position.value_of(key) == Some(value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Ordered `(linked field key, linked value text)` pairs a position chose under one value.
type Combination = Vec<(String, String)>;

/// Groups positions level by level according to a tree definition.
pub struct TreeBuilder<'a> {
    catalog: &'a Catalog,
    levels: Vec<TreeLevel>,
    out_of_structure_label: String,
}

impl<'a> TreeBuilder<'a> {
    /// `levels` are applied in ascending `order`.
    pub fn new(catalog: &'a Catalog, levels: &[TreeLevel]) -> Self {
        let mut levels = levels.to_vec();
        levels.sort_by_key(|l| l.order);
        Self {
            catalog,
            levels,
            out_of_structure_label: OUT_OF_STRUCTURE_LABEL.to_string(),
        }
    }

    pub fn with_out_of_structure_label(mut self, label: impl Into<String>) -> Self {
        self.out_of_structure_label = label.into();
        self
    }

    /// Level keys the catalog has no field for. Building still proceeds;
    /// such a level simply never has values.
    pub fn check_levels(&self) -> Vec<Diagnostic> {
        self.levels
            .iter()
            .map(|l| l.field_key.as_str())
            .unique()
            .filter(|key| self.catalog.field_by_key(key).is_none())
            .map(|key| Diagnostic::UnknownLevelField {
                field_key: key.to_string(),
            })
            .collect()
    }

    /// Build the tree. Every input position appears exactly once as a leaf.
    pub fn build(&self, positions: &[ResolvedPosition]) -> TreeNode {
        debug!(
            "build: {} positions, {} levels",
            positions.len(),
            self.levels.len()
        );
        if self.levels.is_empty() {
            let leaves = positions
                .iter()
                .sorted_by_key(|p| p.id)
                .map(leaf)
                .collect();
            return TreeNode::root(leaves);
        }
        if positions.is_empty() {
            return TreeNode::root(Vec::new());
        }

        let (structured, unstructured): (Vec<&ResolvedPosition>, Vec<&ResolvedPosition>) =
            positions.iter().partition(|p| self.is_structured(p));
        debug!(
            "build: {} structured, {} out of structure",
            structured.len(),
            unstructured.len()
        );

        let mut children = self.partition(&structured, 0, &PathConstraints::default());
        if !unstructured.is_empty() {
            children.push(self.out_of_structure(&unstructured));
        }

        if children.is_empty() {
            debug!("build: grouping produced nothing, falling back to flat list");
            children = positions.iter().map(leaf).collect();
        }
        TreeNode::root(children)
    }

    fn is_structured(&self, position: &ResolvedPosition) -> bool {
        self.levels
            .iter()
            .any(|l| position.value_of(&l.field_key).is_some())
    }

    fn out_of_structure(&self, positions: &[&ResolvedPosition]) -> TreeNode {
        TreeNode::Group(GroupNode {
            level_order: None,
            custom_field_id: None,
            custom_field_key: None,
            custom_field_value: self.out_of_structure_label.clone(),
            linked_custom_fields: Vec::new(),
            label: self.out_of_structure_label.clone(),
            children: positions.iter().map(|p| leaf(p)).collect(),
        })
    }

    fn partition(
        &self,
        positions: &[&ResolvedPosition],
        level_index: usize,
        path: &PathConstraints,
    ) -> Vec<TreeNode> {
        let matching: Vec<&ResolvedPosition> =
            positions.iter().copied().filter(|p| path.matches(p)).collect();

        let Some(level) = self.levels.get(level_index) else {
            return matching.into_iter().map(leaf).collect();
        };
        let key = level.field_key.as_str();

        let (valued, valueless): (Vec<&ResolvedPosition>, Vec<&ResolvedPosition>) = matching
            .into_iter()
            .partition(|p| p.value_of(key).is_some());
        trace!(
            "partition: level {} '{}' at depth {}: {} valued, {} valueless",
            level.order,
            key,
            path.len(),
            valued.len(),
            valueless.len()
        );

        if valued.is_empty() {
            return valueless.into_iter().map(leaf).collect();
        }

        let mut by_value: BTreeMap<&str, Vec<&ResolvedPosition>> = BTreeMap::new();
        for position in valued {
            if let Some(value) = position.value_of(key) {
                by_value.entry(value).or_default().push(position);
            }
        }

        let mut groups = Vec::new();
        for (value, members) in by_value {
            let branch = path.with(key, value);
            let linked = members.iter().any(|p| {
                p.field(key)
                    .is_some_and(|f| self.catalog.has_links(f.value_id))
            });
            if linked {
                groups.extend(self.linked_groups(level, value, &members, level_index, &branch));
            } else {
                let children = self.partition(&members, level_index + 1, &branch);
                groups.push(self.group(level, value, Vec::new(), value.to_string(), children));
            }
        }

        groups.sort_by(|a, b| a.label().cmp(b.label()));
        groups.extend(valueless.into_iter().map(leaf));
        groups
    }

    /// One group per distinct linked-value combination under `value`.
    fn linked_groups(
        &self,
        level: &TreeLevel,
        value: &str,
        members: &[&ResolvedPosition],
        level_index: usize,
        branch: &PathConstraints,
    ) -> Vec<TreeNode> {
        let mut by_combination: BTreeMap<Combination, Vec<&ResolvedPosition>> = BTreeMap::new();
        for &position in members {
            by_combination
                .entry(self.combination(position, &level.field_key))
                .or_default()
                .push(position);
        }

        let plain: Vec<String> = by_combination
            .keys()
            .map(|combination| self.combined_label(value, combination, false))
            .collect();
        let collisions = plain.iter().counts();

        by_combination
            .iter()
            .zip(plain.iter())
            .map(|((combination, group), label)| {
                let label = if collisions.get(label).copied().unwrap_or(0) > 1 {
                    self.combined_label(value, combination, true)
                } else {
                    label.clone()
                };
                let linked = if combination.is_empty() {
                    Vec::new()
                } else {
                    self.ordered_links(group[0], &level.field_key)
                };
                let children = self.partition(group, level_index + 1, branch);
                self.group(level, value, linked, label, children)
            })
            .collect()
    }

    /// `"<value> - <linked> - ..."`; with `qualified` each linked text is
    /// prefixed by its field label so equal texts from different fields differ.
    fn combined_label(&self, value: &str, combination: &Combination, qualified: bool) -> String {
        std::iter::once(value.to_string())
            .chain(combination.iter().map(|(key, text)| {
                if qualified {
                    let field = self
                        .catalog
                        .field_by_key(key)
                        .map_or(key.as_str(), |f| f.label.as_str());
                    format!("{field}: {text}")
                } else {
                    text.clone()
                }
            }))
            .join(LINKED_SEPARATOR)
    }

    fn group(
        &self,
        level: &TreeLevel,
        value: &str,
        linked: Vec<LinkedField>,
        label: String,
        children: Vec<TreeNode>,
    ) -> TreeNode {
        let field = self.catalog.field_by_key(&level.field_key);
        TreeNode::Group(GroupNode {
            level_order: Some(level.order),
            custom_field_id: field.map(|f| f.id),
            custom_field_key: Some(level.field_key.clone()),
            custom_field_value: value.to_string(),
            linked_custom_fields: linked,
            label,
            children,
        })
    }

    /// Tracked linked fields sort by their level order, untracked ones after,
    /// ties broken by linked field key.
    fn link_rank(&self, linked_key: &str) -> (bool, i32) {
        match self.levels.iter().find(|l| l.field_key == linked_key) {
            Some(level) => (false, level.order),
            None => (true, 0),
        }
    }

    fn combination(&self, position: &ResolvedPosition, key: &str) -> Combination {
        let Some(field) = position.field(key) else {
            return Vec::new();
        };
        field
            .linked
            .iter()
            .flat_map(|lf| lf.values.iter().map(move |v| (lf.key.as_str(), v.text.as_str())))
            .sorted_by(|(ka, ta), (kb, tb)| {
                (self.link_rank(ka), *ka, *ta).cmp(&(self.link_rank(kb), *kb, *tb))
            })
            .map(|(k, t)| (k.to_string(), t.to_string()))
            .collect()
    }

    fn ordered_links(&self, position: &ResolvedPosition, key: &str) -> Vec<LinkedField> {
        let Some(field) = position.field(key) else {
            return Vec::new();
        };
        field
            .linked
            .iter()
            .sorted_by(|a, b| {
                (self.link_rank(&a.key), &a.key).cmp(&(self.link_rank(&b.key), &b.key))
            })
            .map(|lf| {
                let mut lf = lf.clone();
                lf.values.sort_by(|a, b| a.text.cmp(&b.text));
                lf
            })
            .collect()
    }
}

fn leaf(position: &ResolvedPosition) -> TreeNode {
    TreeNode::position(
        position.id,
        &position.name,
        position.employee_full_name.as_deref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::{Position, ResolvedField};

    fn resolved(id: i64, pairs: &[(&str, &str)]) -> ResolvedPosition {
        let fields = pairs
            .iter()
            .map(|(k, v)| ResolvedField {
                field_id: uuid::Uuid::nil(),
                key: k.to_string(),
                label: k.to_string(),
                value_id: uuid::Uuid::nil(),
                value: v.to_string(),
                linked: Vec::new(),
            })
            .collect();
        ResolvedPosition::new(&Position::new(id, format!("p{id}")), fields)
    }

    #[test]
    fn test_path_extension_leaves_parent_untouched() {
        let parent = PathConstraints::default().with("dept", "Eng");
        let child = parent.with("team", "Backend");

        assert_eq!(parent.len(), 1);
        assert_eq!(child.len(), 2);
        assert!(parent.matches(&resolved(1, &[("dept", "Eng")])));
        assert!(!child.matches(&resolved(1, &[("dept", "Eng")])));
        assert!(child.matches(&resolved(2, &[("dept", "Eng"), ("team", "Backend")])));
    }

    #[test]
    fn test_empty_value_does_not_match_constraint() {
        let path = PathConstraints::default().with("dept", "");
        assert!(!path.matches(&resolved(1, &[("dept", "")])));
    }

    #[test]
    fn test_unknown_level_key_is_reported_once() {
        let catalog = Catalog::default();
        let levels = [TreeLevel::new(0, "x"), TreeLevel::new(1, "x")];
        let builder = TreeBuilder::new(&catalog, &levels);

        assert_eq!(
            builder.check_levels(),
            vec![Diagnostic::UnknownLevelField {
                field_key: "x".to_string()
            }]
        );
    }
}
