//! Tree definitions and the built tree

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::catalog::LinkedField;
use crate::domain::error::Diagnostic;

/// One depth of the hierarchy: which field groups positions at this level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeLevel {
    pub order: i32,
    pub field_key: String,
}

impl TreeLevel {
    pub fn new(order: i32, field_key: impl Into<String>) -> Self {
        Self {
            order,
            field_key: field_key.into(),
        }
    }
}

/// Administrator-configured recipe for a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDefinition {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub levels: Vec<TreeLevel>,
}

impl TreeDefinition {
    /// Levels ascending by `order`; equal orders keep their stored sequence.
    pub fn sorted_levels(&self) -> Vec<TreeLevel> {
        let mut levels = self.levels.clone();
        levels.sort_by_key(|l| l.order);
        levels
    }
}

/// A custom-field-value branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_field_id: Option<Uuid>,
    /// `None` only for the out-of-structure bucket, so callers add no path filter for it
    pub custom_field_key: Option<String>,
    pub custom_field_value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub linked_custom_fields: Vec<LinkedField>,
    #[serde(skip)]
    pub label: String,
    pub children: Vec<TreeNode>,
}

/// A position leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionNode {
    pub position_id: String,
    pub position_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_full_name: Option<String>,
    pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Root { children: Vec<TreeNode> },
    Group(GroupNode),
    Position(PositionNode),
}

impl TreeNode {
    pub fn root(children: Vec<TreeNode>) -> Self {
        TreeNode::Root { children }
    }

    pub fn position(id: i64, name: &str, employee_full_name: Option<&str>) -> Self {
        TreeNode::Position(PositionNode {
            position_id: id.to_string(),
            position_name: name.to_string(),
            employee_full_name: employee_full_name.map(str::to_string),
            children: Vec::new(),
        })
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Root { children } => children,
            TreeNode::Group(group) => &group.children,
            TreeNode::Position(position) => &position.children,
        }
    }

    /// Display label: combined value label for groups, name for positions.
    pub fn label(&self) -> &str {
        match self {
            TreeNode::Root { .. } => "",
            TreeNode::Group(group) => &group.label,
            TreeNode::Position(position) => &position.position_name,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, TreeNode::Group(_))
    }

    pub fn is_position(&self) -> bool {
        matches!(self, TreeNode::Position(_))
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            TreeNode::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Child group with the given label, if any.
    pub fn group(&self, label: &str) -> Option<&TreeNode> {
        self.children()
            .iter()
            .find(|c| c.is_group() && c.label() == label)
    }

    /// Ids of the position leaves directly under this node, in order.
    pub fn leaf_ids(&self) -> Vec<String> {
        self.children()
            .iter()
            .filter_map(|c| match c {
                TreeNode::Position(p) => Some(p.position_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Ids of every position leaf below this node, depth-first.
    pub fn position_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        self.collect_positions(&mut ids);
        ids
    }

    fn collect_positions(&self, ids: &mut Vec<String>) {
        if let TreeNode::Position(p) = self {
            ids.push(p.position_id.clone());
        }
        for child in self.children() {
            child.collect_positions(ids);
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Position(_) => 1,
            _ => self.children().iter().map(TreeNode::leaf_count).sum(),
        }
    }
}

/// One built tree as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStructure {
    pub tree_id: String,
    pub name: String,
    pub levels: Vec<TreeLevel>,
    pub root: TreeNode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}
