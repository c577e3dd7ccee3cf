//! Chronos Navigator - Dependency-aware schedule merging
//!
//! This crate turns an ontology into one combined timeline:
//! - Cycle detection over the dependency graph
//! - Topological ordering ranked by effective priority, then metric score
//! - Timeline offsetting behind dependees, with explicit slack events
//! - Pluggable scoring of candidate contributions

pub mod config;
pub mod metric;
pub mod navigator;
pub mod order;

pub use config::*;
pub use metric::*;
pub use navigator::*;
pub use order::*;
