//! Ontology - the authoritative store of schemas, entities and dependencies
//!
//! Dependency edges point from a depender to the entity it waits on
//! (its dependee) and carry a relationship kind. Each ordered pair holds at
//! most one kind. A reverse index is kept alongside the forward map so
//! incoming-edge lookups never scan the whole graph.
//!
//! The graph itself performs no cycle detection; that happens at schedule
//! time.

use std::collections::HashMap;
use std::sync::Arc;

use chronos_core::{ChangeEvent, ChronosError, ChronosResult, KeyKind, META_PRIORITY};
use tracing::debug;

use crate::{goal_eid, Entity, Generator, OntologyConfig, Schema};

/// Relationship kind used when none is given
pub const DEFAULT_DEPENDENCY_KIND: &str = "supports";

/// Ontology - owns schemas, entities and the dependency graph
#[derive(Debug, Default)]
pub struct Ontology {
    config: OntologyConfig,
    /// Schemas in registration order
    schemas: Vec<Arc<Schema>>,
    schema_index: HashMap<String, usize>,
    /// Entities in spawn order
    entities: Vec<Entity>,
    entity_index: HashMap<String, usize>,
    /// depender -> [(dependee, kind)] in edge insertion order
    deps: HashMap<String, Vec<(String, String)>>,
    /// dependee -> [depender] in edge insertion order
    reverse_deps: HashMap<String, Vec<String>>,
}

impl Ontology {
    /// Create an empty ontology with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ontology with custom configuration
    pub fn with_config(config: OntologyConfig) -> Self {
        Ontology {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &OntologyConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Schemas
    // ------------------------------------------------------------------

    /// Register a schema
    pub fn add_schema(&mut self, schema: Schema) -> ChronosResult<()> {
        if self.schema_index.contains_key(&schema.type_id) {
            return Err(ChronosError::duplicate(KeyKind::Schema, schema.type_id));
        }
        schema.validate()?;

        debug!(type_id = %schema.type_id, mean_period = schema.mean_period, "schema registered");
        self.schema_index
            .insert(schema.type_id.clone(), self.schemas.len());
        self.schemas.push(Arc::new(schema));
        Ok(())
    }

    /// Look up a schema by type id
    pub fn schema(&self, type_id: &str) -> ChronosResult<&Schema> {
        self.schema_arc(type_id).map(Arc::as_ref)
    }

    fn schema_arc(&self, type_id: &str) -> ChronosResult<&Arc<Schema>> {
        self.schema_index
            .get(type_id)
            .map(|&i| &self.schemas[i])
            .ok_or_else(|| ChronosError::not_found(KeyKind::Schema, type_id))
    }

    /// All schemas in registration order
    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.iter().map(Arc::as_ref)
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    /// Create, generate and register an entity
    ///
    /// The goal event `<entity_id>::goal::<goal_name>` seeds the timeline,
    /// then the generator runs once against the seeded entity. A non-empty
    /// result replaces the timeline (see [`crate::GoalPolicy`] for what
    /// happens to the goal event).
    pub fn spawn<G>(
        &mut self,
        entity_id: &str,
        type_id: &str,
        goal_name: &str,
        generator: G,
        t0: f64,
        priority: i64,
    ) -> ChronosResult<&Entity>
    where
        G: Generator + 'static,
    {
        self.spawn_shared(entity_id, type_id, goal_name, Arc::new(generator), t0, priority)
    }

    /// Same as [`Ontology::spawn`] with an already shared generator
    pub fn spawn_shared(
        &mut self,
        entity_id: &str,
        type_id: &str,
        goal_name: &str,
        generator: Arc<dyn Generator>,
        t0: f64,
        priority: i64,
    ) -> ChronosResult<&Entity> {
        if self.contains_entity(entity_id) {
            return Err(ChronosError::duplicate(KeyKind::Entity, entity_id));
        }
        let schema = Arc::clone(self.schema_arc(type_id)?);

        let goal = ChangeEvent::new(goal_eid(entity_id, goal_name), t0)
            .with_dt(0.0)
            .with_prob(1.0)
            .with_meta(META_PRIORITY, priority);

        let mut entity = Entity::seeded(
            entity_id.to_string(),
            schema,
            goal,
            generator,
            priority,
            self.config.goal_policy,
        );
        entity.regenerate();

        debug!(
            entity = %entity_id,
            type_id = %type_id,
            priority,
            events = entity.timeline().len(),
            "entity spawned"
        );

        let index = self.entities.len();
        self.entity_index.insert(entity_id.to_string(), index);
        self.entities.push(entity);
        Ok(&self.entities[index])
    }

    /// Look up an entity by id
    pub fn entity(&self, eid: &str) -> ChronosResult<&Entity> {
        self.entity_index
            .get(eid)
            .map(|&i| &self.entities[i])
            .ok_or_else(|| ChronosError::not_found(KeyKind::Entity, eid))
    }

    pub fn contains_entity(&self, eid: &str) -> bool {
        self.entity_index.contains_key(eid)
    }

    /// All entities in spawn order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Re-run an entity's generator, replacing its timeline on a
    /// non-empty result
    pub fn regenerate(&mut self, eid: &str) -> ChronosResult<&Entity> {
        let index = *self
            .entity_index
            .get(eid)
            .ok_or_else(|| ChronosError::not_found(KeyKind::Entity, eid))?;

        let entity = &mut self.entities[index];
        if !entity.regenerate() {
            debug!(entity = %eid, "generator kept current timeline");
        }
        Ok(&self.entities[index])
    }

    // ------------------------------------------------------------------
    // Dependency graph
    // ------------------------------------------------------------------

    /// Make `depender` wait on `dependee` with the default kind
    pub fn add_dependency(&mut self, depender: &str, dependee: &str) -> ChronosResult<()> {
        self.add_dependency_with_kind(depender, dependee, DEFAULT_DEPENDENCY_KIND)
    }

    /// Make `depender` wait on `dependee`. An existing edge between the
    /// same pair has its kind overwritten.
    pub fn add_dependency_with_kind(
        &mut self,
        depender: &str,
        dependee: &str,
        kind: impl Into<String>,
    ) -> ChronosResult<()> {
        for eid in [depender, dependee] {
            if !self.entity_index.contains_key(eid) {
                return Err(ChronosError::not_found(KeyKind::Entity, eid));
            }
        }
        let kind = kind.into();
        debug!(depender = %depender, dependee = %dependee, kind = %kind, "dependency added");

        let edges = self.deps.entry(depender.to_string()).or_default();
        if let Some(edge) = edges.iter_mut().find(|(other, _)| other == dependee) {
            edge.1 = kind;
            return Ok(());
        }
        edges.push((dependee.to_string(), kind));
        self.reverse_deps
            .entry(dependee.to_string())
            .or_default()
            .push(depender.to_string());
        Ok(())
    }

    /// Outgoing edges of `eid` as `(dependee, kind)`
    pub fn dependencies_of(&self, eid: &str) -> Vec<(&str, &str)> {
        self.deps
            .get(eid)
            .map(|edges| {
                edges
                    .iter()
                    .map(|(other, kind)| (other.as_str(), kind.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Incoming edges of `eid` as `(depender, kind)`
    pub fn dependents_of(&self, eid: &str) -> Vec<(&str, &str)> {
        let Some(dependers) = self.reverse_deps.get(eid) else {
            return Vec::new();
        };
        dependers
            .iter()
            .filter_map(|depender| {
                self.dependency_kind(depender, eid)
                    .map(|kind| (depender.as_str(), kind))
            })
            .collect()
    }

    /// Number of entities depending on `eid`
    pub fn dependent_count(&self, eid: &str) -> usize {
        self.reverse_deps.get(eid).map_or(0, Vec::len)
    }

    /// Kind of the edge `depender -> dependee`, if present
    pub fn dependency_kind(&self, depender: &str, dependee: &str) -> Option<&str> {
        self.deps
            .get(depender)?
            .iter()
            .find(|(other, _)| other == dependee)
            .map(|(_, kind)| kind.as_str())
    }

    /// Total number of dependency edges
    pub fn edge_count(&self) -> usize {
        self.deps.values().map(Vec::len).sum()
    }

    /// Base priority plus one per dependent, computed from the live graph
    pub fn effective_priority(&self, eid: &str) -> ChronosResult<i64> {
        let entity = self.entity(eid)?;
        Ok(entity.effective_priority(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronos_core::ChangeSet;
    use proptest::prelude::*;

    use crate::{GoalPolicy, OntologyConfig};

    fn one_event(entity: &Entity) -> Option<ChangeSet> {
        let event = ChangeEvent::new(format!("{}-event", entity.eid()), 0.0)
            .with_dt(entity.schema().default_dt);
        Some(ChangeSet::from(vec![event]))
    }

    fn keep(_: &Entity) -> Option<ChangeSet> {
        None
    }

    fn ontology() -> Ontology {
        let mut ont = Ontology::new();
        ont.add_schema(Schema::new("tea-party", 5.0).with_default_dt(0.5))
            .unwrap();
        ont.add_schema(Schema::new("whale", 10.0).with_default_dt(0.2))
            .unwrap();
        ont
    }

    #[test]
    fn test_duplicate_schema() {
        let mut ont = ontology();
        let err = ont.add_schema(Schema::new("whale", 1.0)).unwrap_err();
        assert_eq!(err, ChronosError::duplicate(KeyKind::Schema, "whale"));
        assert_eq!(ont.schemas().count(), 2);
    }

    #[test]
    fn test_invalid_schema_is_not_registered() {
        let mut ont = ontology();
        assert!(ont.add_schema(Schema::new("bad", 0.0)).is_err());
        assert!(ont.schema("bad").is_err());
    }

    #[test]
    fn test_unknown_schema() {
        let ont = ontology();
        assert_eq!(
            ont.schema("petunia").unwrap_err(),
            ChronosError::not_found(KeyKind::Schema, "petunia")
        );
    }

    #[test]
    fn test_spawn_builds_goal() {
        let mut ont = ontology();
        let entity = ont.spawn("tea", "tea-party", "brew", keep, 1.5, 4).unwrap();

        let goal = entity.goal();
        assert_eq!(goal.eid, "tea::goal::brew");
        assert_eq!(goal.t0, 1.5);
        assert_eq!(goal.dt, 0.0);
        assert_eq!(goal.prob, 1.0);
        assert_eq!(goal.meta_value(META_PRIORITY), Some(&serde_json::json!(4)));

        // Generator returned None: the seeded goal is the whole timeline
        assert_eq!(entity.timeline().len(), 1);
        assert_eq!(entity.timeline().get(0), Some(goal));
    }

    #[test]
    fn test_spawn_generator_replaces_timeline() {
        let mut ont = ontology();
        let entity = ont.spawn("tea", "tea-party", "brew", one_event, 0.0, 0).unwrap();

        let ids: Vec<_> = entity.timeline().iter().map(|e| e.eid.as_str()).collect();
        assert_eq!(ids, ["tea-event"]);
        assert_eq!(entity.timeline().get(0).map(|e| e.dt), Some(0.5));
    }

    #[test]
    fn test_strict_config_keeps_goal() {
        let mut ont = Ontology::with_config(OntologyConfig::strict());
        ont.add_schema(Schema::new("whale", 10.0)).unwrap();
        assert_eq!(ont.config().goal_policy, GoalPolicy::AlwaysInclude);

        let entity = ont.spawn("w", "whale", "appear", one_event, 0.0, 0).unwrap();
        let ids: Vec<_> = entity.timeline().iter().map(|e| e.eid.as_str()).collect();
        assert_eq!(ids, ["w::goal::appear", "w-event"]);
    }

    #[test]
    fn test_duplicate_spawn_leaves_state_untouched() {
        let mut ont = ontology();
        ont.spawn("tea", "tea-party", "brew", one_event, 0.0, 0).unwrap();

        let err = ont
            .spawn("tea", "whale", "other", keep, 9.0, 7)
            .unwrap_err();
        assert_eq!(err, ChronosError::duplicate(KeyKind::Entity, "tea"));
        assert_eq!(ont.len(), 1);

        let tea = ont.entity("tea").unwrap();
        assert_eq!(tea.schema().type_id, "tea-party");
        assert_eq!(tea.priority(), 0);
    }

    #[test]
    fn test_spawn_unknown_schema() {
        let mut ont = ontology();
        let err = ont.spawn("x", "nope", "g", keep, 0.0, 0).unwrap_err();
        assert_eq!(err, ChronosError::not_found(KeyKind::Schema, "nope"));
        assert!(ont.is_empty());
    }

    #[test]
    fn test_entities_in_spawn_order() {
        let mut ont = ontology();
        for id in ["c", "a", "b"] {
            ont.spawn(id, "whale", "g", keep, 0.0, 0).unwrap();
        }
        let ids: Vec<_> = ont.entities().iter().map(Entity::eid).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn test_dependency_requires_both_endpoints() {
        let mut ont = ontology();
        ont.spawn("tea", "tea-party", "brew", keep, 0.0, 0).unwrap();

        let err = ont.add_dependency("whale", "tea").unwrap_err();
        assert_eq!(err, ChronosError::not_found(KeyKind::Entity, "whale"));
        let err = ont.add_dependency("tea", "whale").unwrap_err();
        assert_eq!(err, ChronosError::not_found(KeyKind::Entity, "whale"));
        assert_eq!(ont.edge_count(), 0);
    }

    #[test]
    fn test_dependency_views() {
        let mut ont = ontology();
        for id in ["tea", "whale", "petunia"] {
            ont.spawn(id, "whale", "g", keep, 0.0, 0).unwrap();
        }
        ont.add_dependency("whale", "tea").unwrap();
        ont.add_dependency_with_kind("petunia", "tea", "blocks").unwrap();
        ont.add_dependency("petunia", "whale").unwrap();

        assert_eq!(
            ont.dependencies_of("petunia"),
            vec![("tea", "blocks"), ("whale", "supports")]
        );
        assert_eq!(
            ont.dependents_of("tea"),
            vec![("whale", "supports"), ("petunia", "blocks")]
        );
        assert!(ont.dependencies_of("tea").is_empty());
        assert!(ont.dependents_of("unknown").is_empty());
        assert_eq!(ont.edge_count(), 3);

        let tea = ont.entity("tea").unwrap();
        assert_eq!(tea.dependents(&ont).len(), 2);
        assert_eq!(tea.effective_priority(&ont), 2);
    }

    #[test]
    fn test_dependency_overwrites_kind() {
        let mut ont = ontology();
        ont.spawn("a", "whale", "g", keep, 0.0, 0).unwrap();
        ont.spawn("b", "whale", "g", keep, 0.0, 0).unwrap();

        ont.add_dependency("a", "b").unwrap();
        ont.add_dependency_with_kind("a", "b", "blocks").unwrap();

        assert_eq!(ont.dependencies_of("a"), vec![("b", "blocks")]);
        assert_eq!(ont.dependents_of("b"), vec![("a", "blocks")]);
        assert_eq!(ont.dependency_kind("a", "b"), Some("blocks"));
        assert_eq!(ont.effective_priority("b").unwrap(), 1);
    }

    #[test]
    fn test_graph_accepts_self_edge_and_cycles() {
        let mut ont = ontology();
        ont.spawn("a", "whale", "g", keep, 0.0, 0).unwrap();
        ont.spawn("b", "whale", "g", keep, 0.0, 0).unwrap();

        assert!(ont.add_dependency("a", "a").is_ok());
        assert!(ont.add_dependency("a", "b").is_ok());
        assert!(ont.add_dependency("b", "a").is_ok());
        assert_eq!(ont.edge_count(), 3);
    }

    #[test]
    fn test_regenerate() {
        let mut ont = ontology();
        ont.spawn("tea", "tea-party", "brew", one_event, 0.0, 0).unwrap();

        let tea = ont.regenerate("tea").unwrap();
        assert_eq!(tea.timeline().len(), 1);
        assert!(tea.timeline().contains("tea-event"));

        assert_eq!(
            ont.regenerate("nope").unwrap_err(),
            ChronosError::not_found(KeyKind::Entity, "nope")
        );
    }

    #[test]
    fn test_effective_priority_unknown_entity() {
        let ont = ontology();
        assert!(ont.effective_priority("ghost").is_err());
    }

    #[test]
    fn test_effective_priority_saturates() {
        let mut ont = ontology();
        ont.spawn("top", "whale", "g", keep, 0.0, i64::MAX).unwrap();
        ont.spawn("d", "whale", "g", keep, 0.0, 0).unwrap();
        ont.add_dependency("d", "top").unwrap();

        assert_eq!(ont.effective_priority("top").unwrap(), i64::MAX);
    }

    #[test]
    fn test_contains_entity() {
        let mut ont = ontology();
        assert!(!ont.contains_entity("tea"));
        ont.spawn("tea", "tea-party", "brew", keep, 0.0, 0).unwrap();
        assert!(ont.contains_entity("tea"));
        assert!(!ont.contains_entity("tea-party"));
    }

    proptest! {
        #[test]
        fn prop_each_new_depender_adds_one(base in -50i64..50, dependers in 0usize..12) {
            let mut ont = ontology();
            ont.spawn("target", "whale", "g", keep, 0.0, base).unwrap();

            for i in 0..dependers {
                let id = format!("d{i}");
                ont.spawn(&id, "whale", "g", keep, 0.0, 0).unwrap();
                let before = ont.effective_priority("target").unwrap();
                ont.add_dependency(&id, "target").unwrap();
                prop_assert_eq!(ont.effective_priority("target").unwrap(), before + 1);
            }
            prop_assert_eq!(
                ont.effective_priority("target").unwrap(),
                base + dependers as i64
            );
        }
    }
}
