//! Shared ontology - single-writer access for multi-threaded hosts
//!
//! Structural mutations take the write lock; readers hold one read guard
//! for the full duration of a logically connected pass.

use std::sync::Arc;

use chronos_core::ChronosResult;
use parking_lot::{RwLock, RwLockReadGuard};

use crate::{Entity, Generator, Ontology, Schema};

/// Ontology behind a reader/writer lock
#[derive(Clone, Debug, Default)]
pub struct SharedOntology {
    inner: Arc<RwLock<Ontology>>,
}

impl SharedOntology {
    pub fn new(ontology: Ontology) -> Self {
        SharedOntology {
            inner: Arc::new(RwLock::new(ontology)),
        }
    }

    pub fn add_schema(&self, schema: Schema) -> ChronosResult<()> {
        self.inner.write().add_schema(schema)
    }

    /// Spawn an entity; returns a snapshot of it
    pub fn spawn<G>(
        &self,
        entity_id: &str,
        type_id: &str,
        goal_name: &str,
        generator: G,
        t0: f64,
        priority: i64,
    ) -> ChronosResult<Entity>
    where
        G: Generator + 'static,
    {
        self.inner
            .write()
            .spawn(entity_id, type_id, goal_name, generator, t0, priority)
            .cloned()
    }

    pub fn add_dependency(&self, depender: &str, dependee: &str) -> ChronosResult<()> {
        self.inner.write().add_dependency(depender, dependee)
    }

    pub fn add_dependency_with_kind(
        &self,
        depender: &str,
        dependee: &str,
        kind: impl Into<String>,
    ) -> ChronosResult<()> {
        self.inner
            .write()
            .add_dependency_with_kind(depender, dependee, kind)
    }

    /// Regenerate an entity's timeline; returns a snapshot of it
    pub fn regenerate(&self, eid: &str) -> ChronosResult<Entity> {
        self.inner.write().regenerate(eid).cloned()
    }

    /// Hold a read guard. No structural mutation can happen while it lives.
    pub fn read(&self) -> RwLockReadGuard<'_, Ontology> {
        self.inner.read()
    }

    /// Run `f` against a consistent view of the ontology
    pub fn with_read<R>(&self, f: impl FnOnce(&Ontology) -> R) -> R {
        f(&self.inner.read())
    }
}

impl From<Ontology> for SharedOntology {
    fn from(ontology: Ontology) -> Self {
        SharedOntology::new(ontology)
    }
}
