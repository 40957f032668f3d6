//! Domain layer: catalog, resolution and tree building
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).
//! Every function here is total over well-typed inputs.

pub mod builder;
pub mod catalog;
pub mod error;
pub mod position;
pub mod resolver;
pub mod tree;

pub use builder::{PathConstraints, TreeBuilder, OUT_OF_STRUCTURE_LABEL};
pub use catalog::{AllowedValue, Catalog, CustomField, LinkDeclaration, LinkedField, LinkedValue};
pub use error::{Diagnostic, DomainError};
pub use position::{Position, ResolvedField, ResolvedPosition};
pub use resolver::{FieldResolver, Resolution};
pub use tree::{GroupNode, PositionNode, TreeDefinition, TreeLevel, TreeNode, TreeStructure};

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
///
/// Falls back to the input unchanged when expansion fails.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
