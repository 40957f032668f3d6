//! I/O boundary traits for testability
//!
//! These traits abstract the external stores the tree service reads from,
//! allowing services to be tested with in-memory implementations.

use std::io;
use std::path::Path;

use uuid::Uuid;

use crate::domain::{Catalog, Position, TreeDefinition};
use crate::infrastructure::InfraResult;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Source of positions with their raw selections.
pub trait PositionStore: Send + Sync {
    /// All positions, ordered by id.
    fn list_all(&self) -> InfraResult<Vec<Position>>;
}

/// Source of custom field definitions.
pub trait CustomFieldStore: Send + Sync {
    /// A fresh catalog snapshot.
    fn load_catalog(&self) -> InfraResult<Catalog>;
}

/// Source of tree definitions.
pub trait TreeDefinitionStore: Send + Sync {
    /// The definition with `id`, or `None` if there is none.
    fn get(&self, id: Uuid) -> InfraResult<Option<TreeDefinition>>;

    /// All definitions in stored order.
    fn list(&self) -> InfraResult<Vec<TreeDefinition>>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
