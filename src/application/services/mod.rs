//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the store traits (PositionStore, CustomFieldStore, ...)
//! but are themselves concrete structs, not traits.

mod tree;

pub use tree::{TreeOptions, TreeService};
