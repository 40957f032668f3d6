//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use termtree::Tree;

use crate::domain::{Diagnostic, ResolvedField, TreeNode};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Print diagnostics as warnings to stderr
pub fn diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        warning(diagnostic);
    }
}

/// Render a built tree for the terminal.
///
/// Groups show their combined label and leaf count, positions their id and name.
pub fn render_tree(root_label: &str, node: &TreeNode) -> Tree<String> {
    Tree::new(root_label.bold().to_string()).with_leaves(node.children().iter().map(render_node))
}

fn render_node(node: &TreeNode) -> Tree<String> {
    match node {
        TreeNode::Group(group) => {
            let label = format!(
                "{} ({})",
                group.label.cyan(),
                node.leaf_count().to_string().dimmed()
            );
            Tree::new(label).with_leaves(group.children.iter().map(render_node))
        }
        TreeNode::Position(position) => {
            let mut label = format!("#{} {}", position.position_id, position.position_name);
            if let Some(employee) = &position.employee_full_name {
                label.push_str(&format!(" [{}]", employee.dimmed()));
            }
            Tree::new(label)
        }
        TreeNode::Root { .. } => render_tree("", node),
    }
}

/// One line per resolved field, linked values indented below.
pub fn resolved_fields(fields: &[ResolvedField]) {
    for field in fields {
        println!("{}: {}", field.label.green(), field.value);
        for linked in &field.linked {
            let values: Vec<&str> = linked.values.iter().map(|v| v.text.as_str()).collect();
            detail(&format!("{}: {}", linked.label, values.join(", ")));
        }
    }
}
