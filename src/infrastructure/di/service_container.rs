//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{TreeOptions, TreeService};
use crate::config::Settings;
use crate::infrastructure::snapshot::JsonSnapshotStore;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Snapshot store backing all three store traits
    pub store: Arc<JsonSnapshotStore>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let store = Arc::new(JsonSnapshotStore::new(
            Arc::clone(&fs),
            settings.data_file.clone(),
        ));

        Self {
            settings,
            fs,
            store,
        }
    }

    /// Tree service reading from the configured snapshot.
    pub fn tree_service(&self) -> TreeService {
        TreeService::new(self.store.clone(), self.store.clone(), self.store.clone()).with_options(
            TreeOptions {
                out_of_structure_label: self.settings.out_of_structure_label.clone(),
                include_diagnostics: self.settings.include_diagnostics,
            },
        )
    }
}
