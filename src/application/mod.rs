//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on the store traits.

pub mod error;
pub mod selection;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use selection::{FieldSelection, LinkedSelection, Selection, SelectionRequest};
