//! Chronos Ontology - Entities, schemas and the dependency graph
//!
//! This crate implements the authoritative store the scheduler reads:
//! - Schemas (immutable entity type descriptors)
//! - Entities with a goal event and a generated timeline
//! - A directed, labelled dependency graph between entities
//! - Derived priority ("pull" from dependents)
//! - A lock wrapper for hosts that share one ontology across threads

pub mod config;
pub mod entity;
pub mod ontology;
pub mod schema;
pub mod shared;

pub use config::*;
pub use entity::*;
pub use ontology::*;
pub use schema::*;
pub use shared::*;
