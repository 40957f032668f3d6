//! orgtree: classify positions into a hierarchy by custom fields
//!
//! Positions carry raw selections of custom field ids and value ids. The
//! [`domain::FieldResolver`] turns a selection into resolved field entries
//! (including linked fields unlocked by a chosen value), and the
//! [`domain::TreeBuilder`] partitions resolved positions into a tree whose
//! levels are given by a [`domain::TreeDefinition`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
