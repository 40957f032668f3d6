//! Infrastructure layer: store adapters, I/O traits and DI container
//!
//! This layer implements the read interfaces the core consumes and wires up services.

pub mod di;
pub mod error;
pub mod snapshot;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use snapshot::{JsonSnapshotStore, Snapshot};
