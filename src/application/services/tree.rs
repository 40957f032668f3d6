//! Tree service
//!
//! Loads definitions, catalog and positions from the stores, resolves every
//! position and builds the requested tree.

use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::{ApplicationError, ApplicationResult, SelectionRequest};
use crate::domain::{
    Catalog, Diagnostic, FieldResolver, Position, ResolvedField, ResolvedPosition, TreeBuilder,
    TreeDefinition, TreeStructure, OUT_OF_STRUCTURE_LABEL,
};
use crate::infrastructure::traits::{CustomFieldStore, PositionStore, TreeDefinitionStore};

/// Options that shape the built tree without touching its grouping rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    pub out_of_structure_label: String,
    pub include_diagnostics: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            out_of_structure_label: OUT_OF_STRUCTURE_LABEL.to_string(),
            include_diagnostics: true,
        }
    }
}

/// Service for building position trees.
pub struct TreeService {
    positions: Arc<dyn PositionStore>,
    fields: Arc<dyn CustomFieldStore>,
    trees: Arc<dyn TreeDefinitionStore>,
    options: TreeOptions,
}

impl TreeService {
    pub fn new(
        positions: Arc<dyn PositionStore>,
        fields: Arc<dyn CustomFieldStore>,
        trees: Arc<dyn TreeDefinitionStore>,
    ) -> Self {
        Self {
            positions,
            fields,
            trees,
            options: TreeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TreeOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the tree for definition `tree_id`.
    ///
    /// Store failures abort the build; inconsistent ids inside the data do not.
    pub fn build_tree(&self, tree_id: Uuid) -> ApplicationResult<TreeStructure> {
        debug!("build_tree: id={}", tree_id);
        let definition = self
            .trees
            .get(tree_id)
            .map_err(|e| ApplicationError::store("load tree definition", e))?
            .ok_or(ApplicationError::TreeNotFound(tree_id))?;
        self.build_definition(&definition)
    }

    /// Build the default tree: the one flagged `is_default`, else the first by name.
    pub fn build_default_tree(&self) -> ApplicationResult<TreeStructure> {
        let definition = self.default_tree()?;
        self.build_definition(&definition)
    }

    /// Build all positions as a plain list, ignoring any definition.
    pub fn flat_structure(&self) -> ApplicationResult<TreeStructure> {
        let flat = TreeDefinition {
            id: Uuid::nil(),
            name: "flat".to_string(),
            description: None,
            is_default: false,
            levels: Vec::new(),
        };
        self.build_definition(&flat)
    }

    pub fn build_definition(&self, definition: &TreeDefinition) -> ApplicationResult<TreeStructure> {
        let catalog = self.load_catalog()?;
        let positions = self.load_positions()?;

        let (resolved, mut diagnostics) = resolve_all(&catalog, &positions);
        let levels = definition.sorted_levels();
        let builder = TreeBuilder::new(&catalog, &levels)
            .with_out_of_structure_label(self.options.out_of_structure_label.clone());
        diagnostics.extend(builder.check_levels());
        let root = builder.build(&resolved);

        for diagnostic in &diagnostics {
            warn!("build_tree '{}': {}", definition.name, diagnostic);
        }
        debug!(
            "build_tree '{}': {} positions placed, {} diagnostics",
            definition.name,
            root.leaf_count(),
            diagnostics.len()
        );

        Ok(TreeStructure {
            tree_id: definition.id.to_string(),
            name: definition.name.clone(),
            levels,
            root,
            diagnostics: if self.options.include_diagnostics {
                diagnostics
            } else {
                Vec::new()
            },
        })
    }

    /// The default tree definition.
    pub fn default_tree(&self) -> ApplicationResult<TreeDefinition> {
        let trees = self.list_trees()?;
        if let Some(tree) = trees.iter().find(|t| t.is_default) {
            return Ok(tree.clone());
        }
        trees
            .into_iter()
            .min_by(|a, b| a.name.cmp(&b.name))
            .ok_or(ApplicationError::NoTrees)
    }

    pub fn list_trees(&self) -> ApplicationResult<Vec<TreeDefinition>> {
        self.trees
            .list()
            .map_err(|e| ApplicationError::store("list tree definitions", e))
    }

    /// Resolved custom fields of one position, in selection order.
    pub fn position_fields(
        &self,
        position_id: i64,
    ) -> ApplicationResult<(Position, Vec<ResolvedField>, Vec<Diagnostic>)> {
        debug!("position_fields: id={}", position_id);
        let catalog = self.load_catalog()?;
        let position = self
            .load_positions()?
            .into_iter()
            .find(|p| p.id == position_id)
            .ok_or(ApplicationError::PositionNotFound(position_id))?;

        let resolution = FieldResolver::new(&catalog).resolve(&position.field_ids, &position.value_ids);
        Ok((position, resolution.fields, resolution.diagnostics))
    }

    /// Validate a selection request and apply it to a copy of `position`.
    pub fn apply_selection(
        &self,
        position: Position,
        request: &SelectionRequest,
    ) -> ApplicationResult<Position> {
        let catalog = self.load_catalog()?;
        let selection = request.validate(&catalog)?;
        Ok(selection.apply(position))
    }

    /// Validate a selection request against the current catalog.
    pub fn validate_selection(&self, request: &SelectionRequest) -> ApplicationResult<Vec<ResolvedField>> {
        let catalog = self.load_catalog()?;
        let selection = request.validate(&catalog)?;
        Ok(FieldResolver::new(&catalog)
            .resolve(&selection.field_ids, &selection.value_ids)
            .fields)
    }

    fn load_catalog(&self) -> ApplicationResult<Catalog> {
        self.fields
            .load_catalog()
            .map_err(|e| ApplicationError::store("load custom fields", e))
    }

    fn load_positions(&self) -> ApplicationResult<Vec<Position>> {
        self.positions
            .list_all()
            .map_err(|e| ApplicationError::store("load positions", e))
    }
}

/// Resolve every position; diagnostics are de-duplicated, catalog ones first.
fn resolve_all(catalog: &Catalog, positions: &[Position]) -> (Vec<ResolvedPosition>, Vec<Diagnostic>) {
    let resolver = FieldResolver::new(catalog);
    let mut diagnostics = catalog.diagnostics().to_vec();
    let mut resolved = Vec::with_capacity(positions.len());
    for position in positions {
        let (entry, found) = resolver.resolve_position(position);
        resolved.push(entry);
        diagnostics.extend(found);
    }
    let diagnostics = diagnostics.into_iter().unique().collect();
    (resolved, diagnostics)
}
