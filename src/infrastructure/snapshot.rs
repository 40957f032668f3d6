//! JSON snapshot store
//!
//! A snapshot is one JSON document holding every custom field definition,
//! position and tree definition:
//!
//! ```json
//! { "custom_fields": [...], "positions": [...], "trees": [...] }
//! ```
//!
//! [`JsonSnapshotStore`] re-reads the file on every call so that each build
//! sees the current data.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Catalog, CustomField, Position, TreeDefinition};
use crate::infrastructure::traits::{
    CustomFieldStore, FileSystem, PositionStore, TreeDefinitionStore,
};
use crate::infrastructure::{InfraError, InfraResult};

/// In-memory contents of a snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub trees: Vec<TreeDefinition>,
}

impl Snapshot {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

impl PositionStore for Snapshot {
    fn list_all(&self) -> InfraResult<Vec<Position>> {
        let mut positions = self.positions.clone();
        positions.sort_by_key(|p| p.id);
        Ok(positions)
    }
}

impl CustomFieldStore for Snapshot {
    fn load_catalog(&self) -> InfraResult<Catalog> {
        Ok(Catalog::new(self.custom_fields.clone()))
    }
}

impl TreeDefinitionStore for Snapshot {
    fn get(&self, id: Uuid) -> InfraResult<Option<TreeDefinition>> {
        Ok(self.trees.iter().find(|t| t.id == id).cloned())
    }

    fn list(&self) -> InfraResult<Vec<TreeDefinition>> {
        Ok(self.trees.clone())
    }
}

/// Snapshot file read through a [`FileSystem`].
pub struct JsonSnapshotStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole snapshot. Missing or malformed files are hard failures.
    pub fn load(&self) -> InfraResult<Snapshot> {
        debug!("snapshot: reading {}", self.path.display());
        if !self.fs.exists(&self.path) {
            return Err(InfraError::io(
                format!("snapshot not found: {}", self.path.display()),
                std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| InfraError::io(format!("read {}", self.path.display()), e))?;
        Snapshot::from_json(&content)
            .map_err(|e| InfraError::parse(format!("parse {}", self.path.display()), e))
    }
}

impl PositionStore for JsonSnapshotStore {
    fn list_all(&self) -> InfraResult<Vec<Position>> {
        self.load()?.list_all()
    }
}

impl CustomFieldStore for JsonSnapshotStore {
    fn load_catalog(&self) -> InfraResult<Catalog> {
        self.load()?.load_catalog()
    }
}

impl TreeDefinitionStore for JsonSnapshotStore {
    fn get(&self, id: Uuid) -> InfraResult<Option<TreeDefinition>> {
        self.load()?.get(id)
    }

    fn list(&self) -> InfraResult<Vec<TreeDefinition>> {
        self.load()?.list()
    }
}
