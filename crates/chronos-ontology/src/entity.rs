//! Entity - a goal-seeking instance of a schema
//!
//! Each entity carries a goal event and a timeline produced by its
//! generator. The timeline is only ever replaced wholesale by re-running
//! the generator.

use std::fmt;
use std::sync::Arc;

use chronos_core::{ChangeEvent, ChangeSet};
use tracing::{debug, warn};

use crate::{GoalPolicy, Ontology, Schema};

/// Produces a timeline for an entity
///
/// Returning `None` (or an empty change set) keeps the current timeline.
pub trait Generator: Send + Sync {
    fn generate(&self, entity: &Entity) -> Option<ChangeSet>;
}

impl<F> Generator for F
where
    F: Fn(&Entity) -> Option<ChangeSet> + Send + Sync,
{
    fn generate(&self, entity: &Entity) -> Option<ChangeSet> {
        self(entity)
    }
}

/// Goal event identifier for an entity
pub fn goal_eid(entity_id: &str, goal_name: &str) -> String {
    format!("{entity_id}::goal::{goal_name}")
}

/// Entity - named schema instance with a goal and a timeline
#[derive(Clone)]
pub struct Entity {
    eid: String,
    schema: Arc<Schema>,
    goal: ChangeEvent,
    timeline: ChangeSet,
    generator: Arc<dyn Generator>,
    priority: i64,
    goal_policy: GoalPolicy,
}

impl Entity {
    /// Build an entity whose timeline holds only its goal event.
    /// The generator has not run yet.
    pub(crate) fn seeded(
        eid: String,
        schema: Arc<Schema>,
        goal: ChangeEvent,
        generator: Arc<dyn Generator>,
        priority: i64,
        goal_policy: GoalPolicy,
    ) -> Self {
        let timeline = ChangeSet::from(vec![goal.clone()]);
        Entity {
            eid,
            schema,
            goal,
            timeline,
            generator,
            priority,
            goal_policy,
        }
    }

    pub fn eid(&self) -> &str {
        &self.eid
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn goal(&self) -> &ChangeEvent {
        &self.goal
    }

    pub fn timeline(&self) -> &ChangeSet {
        &self.timeline
    }

    /// Base priority set at spawn time
    pub fn priority(&self) -> i64 {
        self.priority
    }

    /// Outgoing edges: entities this one depends on
    pub fn dependencies<'a>(&self, ontology: &'a Ontology) -> Vec<(&'a str, &'a str)> {
        ontology.dependencies_of(&self.eid)
    }

    /// Incoming edges: entities that depend on this one
    pub fn dependents<'a>(&self, ontology: &'a Ontology) -> Vec<(&'a str, &'a str)> {
        ontology.dependents_of(&self.eid)
    }

    /// Base priority plus one for every dependent
    pub fn effective_priority(&self, ontology: &Ontology) -> i64 {
        let pull = i64::try_from(ontology.dependent_count(&self.eid)).unwrap_or(i64::MAX);
        self.priority.saturating_add(pull)
    }

    /// Re-run the generator. Returns true if the timeline was replaced.
    pub fn regenerate(&mut self) -> bool {
        let generated = self.generator.generate(self);
        self.apply_generated(generated)
    }

    pub(crate) fn apply_generated(&mut self, generated: Option<ChangeSet>) -> bool {
        let Some(mut timeline) = generated.filter(|t| !t.is_empty()) else {
            return false;
        };

        if !timeline.contains(&self.goal.eid) {
            match self.goal_policy {
                GoalPolicy::AsGenerated => {
                    warn!(
                        entity = %self.eid,
                        goal = %self.goal.eid,
                        "generated timeline drops the goal event"
                    );
                }
                GoalPolicy::AlwaysInclude => timeline.prepend(self.goal.clone()),
            }
        }

        debug!(entity = %self.eid, events = timeline.len(), "timeline replaced");
        self.timeline = timeline;
        true
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("eid", &self.eid)
            .field("schema", &self.schema.type_id)
            .field("goal", &self.goal.eid)
            .field("timeline", &self.timeline.len())
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
